//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank, Chunk, IndexedEpisode, SearchResult, VectorStore};
use crate::error::{DataCommitError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory vector store. Chunks are kept in insertion order.
pub struct MemoryVectorStore {
    chunks: RwLock<Vec<Chunk>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> DataCommitError {
    DataCommitError::VectorStore(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn write_chunks(&self, chunks: &[Chunk]) -> Result<usize> {
        let mut store = self.chunks.write().map_err(poisoned)?;
        store.extend_from_slice(chunks);
        Ok(chunks.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let chunks = self.chunks.read().map_err(poisoned)?;
        Ok(rank(query_embedding, chunks.iter().cloned(), limit))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.chunks.read().map_err(poisoned)?.len())
    }

    async fn list_episodes(&self) -> Result<Vec<IndexedEpisode>> {
        let chunks = self.chunks.read().map_err(poisoned)?;

        let mut by_episode: BTreeMap<(u32, String), u32> = BTreeMap::new();
        for chunk in chunks.iter() {
            *by_episode
                .entry((chunk.episode, chunk.guest.clone()))
                .or_insert(0) += 1;
        }

        Ok(by_episode
            .into_iter()
            .map(|((episode, guest), chunk_count)| IndexedEpisode {
                episode,
                guest,
                chunk_count,
            })
            .collect())
    }

    async fn clear(&self) -> Result<usize> {
        let mut chunks = self.chunks.write().map_err(poisoned)?;
        let deleted = chunks.len();
        chunks.clear();
        Ok(deleted)
    }
}
