//! CLI command implementations.

mod ask;
mod clean;
mod config;
mod doctor;
mod download;
mod ingest;
mod rename;
mod serve;
mod status;
mod transcribe;

pub use ask::run_ask;
pub use clean::run_clean;
pub use config::run_config;
pub use doctor::run_doctor;
pub use download::run_download;
pub use ingest::run_ingest;
pub use rename::run_rename_speakers;
pub use serve::run_serve;
pub use status::run_status;
pub use transcribe::run_transcribe;

use crate::config::Settings;
use crate::vector_store::SqliteVectorStore;
use std::sync::Arc;

/// Open the configured SQLite collection.
fn open_store(settings: &Settings) -> anyhow::Result<Arc<SqliteVectorStore>> {
    let path = settings.sqlite_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Arc::new(SqliteVectorStore::new(
        &path,
        &settings.vector_store.collection,
    )?))
}
