//! SQLite-based vector store implementation.
//!
//! Embeddings are stored as little-endian f32 blobs and scored with cosine
//! similarity in Rust. Every row belongs to a named collection.

use super::{rank, Chunk, IndexedEpisode, SearchResult, VectorStore};
use crate::error::{DataCommitError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        episode INTEGER NOT NULL,
        guest TEXT NOT NULL,
        content TEXT NOT NULL,
        split_id INTEGER NOT NULL,
        split_idx_start INTEGER NOT NULL,
        source_file TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);
    CREATE INDEX IF NOT EXISTS idx_chunks_episode ON chunks(collection, episode);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    collection: String,
}

impl SqliteVectorStore {
    /// Open (or create) a store at `path`, scoped to `collection`.
    #[instrument(skip_all, fields(collection = %collection))]
    pub fn new(path: &Path, collection: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory(collection: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    /// Name of the collection this store reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DataCommitError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_chunk(row: &Row<'_>) -> rusqlite::Result<Chunk> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(6)?;
        let indexed_at_str: String = row.get(7)?;
        let split_idx_start: i64 = row.get(4)?;

        Ok(Chunk {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            episode: row.get(1)?,
            guest: row.get(2)?,
            content: row.get(3)?,
            split_idx_start: split_idx_start as usize,
            source_file: row.get(5)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            split_id: row.get(8)?,
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn write_chunks(&self, chunks: &[Chunk]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            tx.execute(
                r#"
                INSERT INTO chunks
                (id, collection, episode, guest, content, split_id, split_idx_start,
                 source_file, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    chunk.id.to_string(),
                    self.collection,
                    chunk.episode,
                    chunk.guest,
                    chunk.content,
                    chunk.split_id,
                    chunk.split_idx_start as i64,
                    chunk.source_file,
                    Self::embedding_to_bytes(&chunk.embedding),
                    chunk.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Wrote {} chunks to collection {}", chunks.len(), self.collection);
        Ok(chunks.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, episode, guest, content, split_idx_start, source_file,
                   embedding, indexed_at, split_id
            FROM chunks
            WHERE collection = ?1
            ORDER BY rowid
            "#,
        )?;

        let chunks = stmt
            .query_map(params![self.collection], Self::row_to_chunk)?
            .collect::<rusqlite::Result<Vec<Chunk>>>()?;

        if let Some(first) = chunks.first() {
            if first.embedding.len() != query_embedding.len() {
                warn!(
                    "Query embedding has {} dimensions, stored chunks have {}",
                    query_embedding.len(),
                    first.embedding.len()
                );
            }
        }

        let results = rank(query_embedding, chunks, limit);
        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn list_episodes(&self) -> Result<Vec<IndexedEpisode>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT episode, guest, COUNT(*) as chunk_count
            FROM chunks
            WHERE collection = ?1
            GROUP BY episode, guest
            ORDER BY episode
            "#,
        )?;

        let episodes = stmt
            .query_map(params![self.collection], |row| {
                Ok(IndexedEpisode {
                    episode: row.get(0)?,
                    guest: row.get(1)?,
                    chunk_count: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(episodes)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM chunks WHERE collection = ?1",
            params![self.collection],
        )?;
        info!("Deleted {} chunks from collection {}", deleted, self.collection);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(episode: u32, guest: &str, content: &str, embedding: Vec<f32>) -> Chunk {
        Chunk::new(episode, guest.to_string(), content.to_string(), 0, 0, "ep.txt".to_string())
            .with_embedding(embedding)
    }

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory("datacommit_all").unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        let written = store
            .write_chunks(&[
                chunk(1, "Kaan Bıçakçı", "staj ve ilk iş", vec![1.0, 0.0, 0.0]),
                chunk(2, "Bilge Yücel", "açık kaynak", vec![0.0, 1.0, 0.0]),
                chunk(2, "Bilge Yücel", "topluluk", vec![0.0, 0.9, 0.1]),
            ])
            .await
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(store.count().await.unwrap(), 3);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.episode, 1);
        assert_eq!(results[0].chunk.guest, "Kaan Bıçakçı");
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].chunk.embedding, vec![1.0, 0.0, 0.0]);

        let episodes = store.list_episodes().await.unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[1].chunk_count, 2);

        assert_eq!(store.clear().await.unwrap(), 3);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let store = SqliteVectorStore::in_memory("c").unwrap();
        let chunks: Vec<Chunk> = (0..7)
            .map(|i| chunk(1, "G", &format!("c{}", i), vec![1.0, i as f32]))
            .collect();
        store.write_chunks(&chunks).await.unwrap();

        assert_eq!(store.search(&[1.0, 0.0], 5).await.unwrap().len(), 5);
        assert_eq!(store.search(&[1.0, 0.0], 50).await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_undecodable_row_is_an_error() {
        let store = SqliteVectorStore::in_memory("c").unwrap();
        store.write_chunks(&[chunk(1, "G", "x", vec![1.0])]).await.unwrap();
        store
            .lock()
            .unwrap()
            .execute("UPDATE chunks SET episode = 'bir'", [])
            .unwrap();

        assert!(matches!(
            store.search(&[1.0], 5).await,
            Err(DataCommitError::Database(_))
        ));
        assert!(matches!(
            store.list_episodes().await,
            Err(DataCommitError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        let a = SqliteVectorStore::new(&path, "a").unwrap();
        a.write_chunks(&[chunk(1, "G", "x", vec![1.0])]).await.unwrap();
        drop(a);

        let b = SqliteVectorStore::new(&path, "b").unwrap();
        assert_eq!(b.count().await.unwrap(), 0);
        drop(b);

        let reopened = SqliteVectorStore::new(&path, "a").unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }
}
