//! Vector store abstraction for DataCommit.
//!
//! Provides a trait-based interface for different vector database backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A transcript chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Episode number this chunk belongs to.
    pub episode: u32,
    /// Guest of the episode.
    pub guest: String,
    /// Text content of this chunk.
    pub content: String,
    /// Position of this chunk among the chunks of its source file.
    pub split_id: u32,
    /// Character offset of the chunk in its source file.
    pub split_idx_start: usize,
    /// Transcript file the chunk was cut from.
    pub source_file: String,
    /// Embedding vector.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Chunk {
    /// Create a new chunk without an embedding.
    pub fn new(
        episode: u32,
        guest: String,
        content: String,
        split_id: u32,
        split_idx_start: usize,
        source_file: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            episode,
            guest,
            content,
            split_id,
            split_idx_start,
            source_file,
            embedding: Vec::new(),
            indexed_at: Utc::now(),
        }
    }

    /// Attach an embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Per-episode summary of the indexed corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedEpisode {
    pub episode: u32,
    pub guest: String,
    pub chunk_count: u32,
}

/// Trait for vector store implementations.
///
/// Stores are append-only: chunks are never updated in place.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Write chunks (with embeddings) in one batch.
    async fn write_chunks(&self, chunks: &[Chunk]) -> Result<usize>;

    /// Return up to `limit` chunks ranked by descending cosine similarity.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Total chunk count.
    async fn count(&self) -> Result<usize>;

    /// Chunk counts grouped by episode, in episode order.
    async fn list_episodes(&self) -> Result<Vec<IndexedEpisode>>;

    /// Remove every chunk. Returns the number of chunks deleted.
    async fn clear(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score and rank chunks against a query embedding.
///
/// The sort is stable, so equal scores keep the input order.
pub(crate) fn rank<I>(query_embedding: &[f32], chunks: I, limit: usize) -> Vec<SearchResult>
where
    I: IntoIterator<Item = Chunk>,
{
    let mut results: Vec<SearchResult> = chunks
        .into_iter()
        .map(|chunk| {
            let score = cosine_similarity(query_embedding, &chunk.embedding);
            SearchResult { chunk, score }
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}
