//! DataCommit - question answering over the DataCommit podcast
//!
//! Answers Turkish questions about the DataCommit podcast, a data-science
//! career show, by retrieving transcript passages and citing the episodes
//! and guests they came from.
//!
//! # Overview
//!
//! - Ingest speaker-labelled episode transcripts into a local vector store
//! - Answer questions through a web chat or the terminal
//! - Prepare new transcripts: download, transcribe, cluster speakers,
//!   clean with an LLM and name the speakers
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `chunking` - Word-window transcript splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - SQLite and in-memory chunk stores
//! - `generation` - Text generation (Gemini, OpenAI)
//! - `ingest` - One-time corpus ingestion
//! - `rag` - The query pipeline
//! - `server` - HTTP chat API and static front end
//! - `audio`, `transcription`, `preprocess` - Corpus preparation tools
//!
//! # Example
//!
//! ```rust,no_run
//! use datacommit::config::Settings;
//! use datacommit::rag::QueryPipeline;
//! use datacommit::vector_store::SqliteVectorStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let store = Arc::new(SqliteVectorStore::new(
//!         &settings.sqlite_path(),
//!         &settings.vector_store.collection,
//!     )?);
//!     let pipeline = QueryPipeline::from_settings(&settings, store)?;
//!
//!     let answer = pipeline.respond("Junior'lar nasıl iş bulur?", 5).await?;
//!     println!("{}", answer.response);
//!     for source in answer.sources {
//!         println!("Bölüm {}: {}", source.episode, source.guest);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod openai;
pub mod preprocess;
pub mod rag;
pub mod server;
pub mod transcription;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use error::{DataCommitError, Result};
