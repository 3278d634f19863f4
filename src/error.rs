//! Error types for DataCommit.

use thiserror::Error;

/// Library-level error type for DataCommit operations.
#[derive(Error, Debug)]
pub enum DataCommitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Speaker clustering failed: {0}")]
    Diarization(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Ingestion error: {0}")]
    Ingest(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Transcript cleaning failed at chunk {chunk}/{total}: {message}")]
    Cleaning {
        chunk: usize,
        total: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for DataCommit operations.
pub type Result<T> = std::result::Result<T, DataCommitError>;
