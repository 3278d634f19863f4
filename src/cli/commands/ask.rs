//! Ask command implementation.

use super::open_store;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::QueryPipeline;
use anyhow::Result;

/// Answer one question in the terminal, optionally printing the retrieved chunks.
pub async fn run_ask(question: &str, k: Option<usize>, show_chunks: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'datacommit doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let store = open_store(&settings)?;
    let pipeline = QueryPipeline::from_settings(&settings, store)?;
    let k = k.unwrap_or_else(|| pipeline.top_k());

    let count = pipeline.document_count().await?;
    if count == 0 {
        Output::warning("No documents found! Run 'datacommit ingest' first.");
        return Ok(());
    }

    println!();
    Output::rule('=');
    println!("SORU: {}", question);
    Output::rule('=');

    if show_chunks {
        Output::section("Retrieved Chunks");
        let results = pipeline.inspect(question, k).await?;
        println!("Retrieved {} chunks:", results.len());
        Output::rule('=');
        for (i, result) in results.iter().enumerate() {
            Output::chunk(
                i + 1,
                result.chunk.episode,
                &result.chunk.guest,
                result.score,
                &result.chunk.content,
            );
        }
    }

    let spinner = Output::spinner("Cevap hazırlanıyor...");
    let answer = pipeline.respond(question, k).await;
    spinner.finish_and_clear();

    let answer = match answer {
        Ok(answer) => answer,
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    };

    Output::section("CEVAP");
    println!("{}", answer.response);

    Output::section("KAYNAKLAR");
    for source in &answer.sources {
        Output::source(source.episode, &source.guest, source.score);
    }

    Ok(())
}
