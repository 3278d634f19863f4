//! One-time ingestion of the transcript corpus into the vector store.

use crate::chunking::WordSplitter;
use crate::config::EpisodeSettings;
use crate::embedding::Embedder;
use crate::error::{DataCommitError, Result};
use crate::vector_store::{Chunk, VectorStore};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Chunks produced for one episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeIngest {
    pub episode: u32,
    pub guest: String,
    pub chunks: usize,
}

/// An episode whose transcript file was not found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEpisode {
    pub episode: u32,
    pub file: String,
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub episodes: Vec<EpisodeIngest>,
    pub skipped: Vec<SkippedEpisode>,
    /// Chunks written by this run.
    pub written: usize,
    /// Set when the store already held chunks and nothing was written.
    pub skipped_existing: Option<usize>,
}

/// Splits, embeds and stores the configured transcripts.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    splitter: WordSplitter,
}

impl Ingestor {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        splitter: WordSplitter,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            splitter,
        }
    }

    /// Ingest every episode found under `transcripts_dir`.
    ///
    /// Refuses to write anything when the store is not empty.
    #[instrument(skip(self, episodes), fields(dir = %transcripts_dir.display()))]
    pub async fn ingest(
        &self,
        episodes: &[EpisodeSettings],
        transcripts_dir: &Path,
    ) -> Result<IngestReport> {
        let existing = self.vector_store.count().await?;
        if existing > 0 {
            info!("Store already has {} chunks, skipping ingestion", existing);
            return Ok(IngestReport {
                skipped_existing: Some(existing),
                ..IngestReport::default()
            });
        }

        let mut report = IngestReport::default();
        let mut chunks: Vec<Chunk> = Vec::new();

        for ep in episodes {
            let path = transcripts_dir.join(&ep.file);
            if !path.exists() {
                warn!("Skipping episode {}: file not found: {}", ep.episode, ep.file);
                report.skipped.push(SkippedEpisode {
                    episode: ep.episode,
                    file: ep.file.clone(),
                });
                continue;
            }

            let text = std::fs::read_to_string(&path)?;
            let splits = self.splitter.split(&text);
            info!("Episode {} ({}): {} chunks", ep.episode, ep.guest, splits.len());

            report.episodes.push(EpisodeIngest {
                episode: ep.episode,
                guest: ep.guest.clone(),
                chunks: splits.len(),
            });

            chunks.extend(splits.into_iter().map(|s| {
                Chunk::new(
                    ep.episode,
                    ep.guest.clone(),
                    s.content,
                    s.split_id,
                    s.split_idx_start,
                    ep.file.clone(),
                )
            }));
        }

        if chunks.is_empty() {
            warn!("No transcript chunks to ingest");
            return Ok(report);
        }

        info!("Embedding {} chunks", chunks.len());
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(DataCommitError::Ingest(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let chunks: Vec<Chunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| chunk.with_embedding(embedding))
            .collect();

        report.written = self.vector_store.write_chunks(&chunks).await?;
        info!(
            "Ingested {} chunks from {} episodes",
            report.written,
            report.episodes.len()
        );

        Ok(report)
    }
}
