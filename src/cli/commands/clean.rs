//! Clean command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::generation::create_generator;
use crate::preprocess::TranscriptCleaner;
use anyhow::Result;
use std::path::Path;

/// Clean a transcript chunk by chunk, resuming an interrupted run.
pub async fn run_clean(input: &Path, output: &Path, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Clean, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let generator = create_generator(
        settings.cleanup.provider,
        &settings.cleanup.model,
        &settings.rag.gemini_base_url,
    )?;
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let cleaner = TranscriptCleaner::from_settings(generator, &settings.cleanup, prompts);

    Output::info(&format!(
        "Cleaning {} with {} ({})",
        input.display(),
        settings.cleanup.model,
        settings.cleanup.provider
    ));

    let pb = Output::progress_bar(0, "chunks cleaned");
    let result = cleaner
        .clean_file(input, output, |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await;
    pb.finish_and_clear();

    match result {
        Ok(report) => {
            if report.resumed_from > 0 {
                Output::info(&format!(
                    "Resumed after chunk {}/{}",
                    report.resumed_from, report.total_chunks
                ));
            }
            Output::success(&format!(
                "Cleaned {} chunks, saved to {}",
                report.cleaned_chunks,
                report.output.display()
            ));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Progress was saved; rerun the same command to resume.");
            Err(e.into())
        }
    }
}
