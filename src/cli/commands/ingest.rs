//! Ingest command implementation.

use super::open_store;
use crate::chunking::WordSplitter;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::ingest::Ingestor;
use crate::vector_store::VectorStore;
use anyhow::Result;
use std::sync::Arc;

/// Split, embed and store every configured transcript.
pub async fn run_ingest(reset: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let store = open_store(&settings)?;
    if reset {
        let removed = store.count().await?;
        store.clear().await?;
        Output::info(&format!("Removed {} chunks from '{}'", removed, store.collection()));
    }

    let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
    let splitter = WordSplitter::from_settings(&settings.splitter)?;
    let ingestor = Ingestor::new(embedder, store, splitter);

    let transcripts_dir = settings.transcripts_dir();
    let spinner = Output::spinner(&format!("Embedding transcripts from {}...", transcripts_dir.display()));
    let report = ingestor
        .ingest(&settings.corpus.episodes, &transcripts_dir)
        .await;
    spinner.finish_and_clear();
    let report = report?;

    if let Some(existing) = report.skipped_existing {
        Output::warning(&format!("Database already has {} chunks", existing));
        Output::info("Run 'datacommit ingest --reset' to re-ingest");
        return Ok(());
    }

    for skipped in &report.skipped {
        Output::warning(&format!(
            "Skipping Episode {} - file not found: {}",
            skipped.episode, skipped.file
        ));
    }
    for episode in &report.episodes {
        Output::list_item(&format!(
            "Episode {} ({}): {} chunks",
            episode.episode, episode.guest, episode.chunks
        ));
    }

    Output::success(&format!(
        "Ingested {} chunks from {} episodes",
        report.written,
        report.episodes.len()
    ));
    Ok(())
}
