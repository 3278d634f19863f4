//! Deterministic stand-ins for the hosted services, shared by unit tests.

use crate::embedding::Embedder;
use crate::error::{DataCommitError, Result};
use crate::generation::{GenerationOptions, Generator};
use crate::vector_store::{Chunk, MemoryVectorStore, VectorStore};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const DIMS: usize = 16;

/// Embeds text as a histogram of its bytes.
pub struct ByteEmbedder {
    calls: AtomicUsize,
}

impl ByteEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed`/`embed_batch` invocations.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIMS];
        for b in text.bytes() {
            v[b as usize % DIMS] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for ByteEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// Returns a canned reply and records the prompts it was sent.
pub struct StubGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails.
    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| DataCommitError::Generation("stub failure".to_string()))
    }

    fn model(&self) -> &str {
        "stub"
    }
}

/// A memory store holding a few chunks from every default episode.
pub async fn seeded_store(embedder: &dyn Embedder) -> Arc<dyn VectorStore> {
    let roster = [
        (1, "Kaan Bıçakçı", "Junior adaylar staj ve kişisel projelerle iş bulur."),
        (2, "Bilge Yücel", "Açık kaynak katkısı özgeçmişte fark yaratır."),
        (3, "Alara Dirik", "Araştırma ile ürün arasındaki denge önemlidir."),
        (4, "Olgun Aydın", "İstatistik temeli veri biliminin omurgasıdır."),
        (5, "Eren Akbaba", "Mülakatlarda problem çözme yaklaşımı sorulur."),
        (6, "Taner Sekmen", "MLOps modelleri canlıya almayı kolaylaştırır."),
        (7, "Murat Şahin", "Topluluk etkinlikleri ağ kurmaya yardım eder."),
        (8, "Göker Güner", "Kaggle yarışmaları pratik kazandırır."),
    ];

    let mut chunks = Vec::new();
    for (episode, guest, text) in roster {
        for (i, part) in [text, "veri bilimi kariyeri hakkında sohbet"].iter().enumerate() {
            let embedding = embedder.embed(part).await.unwrap();
            chunks.push(
                Chunk::new(
                    episode,
                    guest.to_string(),
                    part.to_string(),
                    i as u32,
                    0,
                    format!("datacommit_{}.txt", episode),
                )
                .with_embedding(embedding),
            );
        }
    }

    let store = MemoryVectorStore::new();
    store.write_chunks(&chunks).await.unwrap();
    Arc::new(store)
}
