//! Status command implementation.

use super::open_store;
use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::VectorStore;
use anyhow::Result;
use console::style;

/// Show what the index holds, per episode.
pub async fn run_status(settings: Settings) -> Result<()> {
    let store = open_store(&settings)?;
    let total = store.count().await?;

    Output::header("DataCommit Index");
    Output::kv("Database", &settings.sqlite_path().display().to_string());
    Output::kv("Collection", store.collection());
    Output::kv("Chunks", &total.to_string());

    if total == 0 {
        println!();
        Output::warning("The index is empty. Run 'datacommit ingest' first.");
        return Ok(());
    }

    let indexed = store.list_episodes().await?;
    println!();
    for episode in &indexed {
        Output::list_item(&format!(
            "Bölüm {}: {} {}",
            episode.episode,
            style(&episode.guest).bold(),
            style(format!("({} chunks)", episode.chunk_count)).dim()
        ));
    }

    let missing: Vec<String> = settings
        .corpus
        .episodes
        .iter()
        .filter(|e| !indexed.iter().any(|i| i.episode == e.episode))
        .map(|e| format!("{} ({})", e.episode, e.guest))
        .collect();
    if !missing.is_empty() {
        println!();
        Output::warning(&format!("Not indexed: {}", missing.join(", ")));
    }

    Ok(())
}
