//! Serve command: the chat web server.

use super::open_store;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::QueryPipeline;
use crate::server::{self, AppState};
use std::sync::Arc;

/// Build the pipeline and serve the chat API until stopped.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let store = open_store(&settings)?;
    let pipeline = Arc::new(QueryPipeline::from_settings(&settings, store)?);

    let documents = pipeline.document_count().await?;
    if documents == 0 {
        Output::warning("The index is empty. Run 'datacommit ingest' to load the transcripts.");
    }

    let state = Arc::new(AppState::from_settings(pipeline, &settings));
    let static_dir = settings.static_dir();
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    Output::header("DataCommit Chat");
    println!();
    Output::success(&format!("Listening on http://{}:{}", host, port));
    Output::kv("Chunks", &documents.to_string());
    Output::kv("Static files", &static_dir.display().to_string());
    println!();
    println!("Endpoints:");
    Output::kv("Chat", "POST /api/chat");
    Output::kv("Status", "GET  /api/status");
    Output::kv("Web UI", "GET  /");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::run(state, &static_dir, &host, port).await
}
