//! Rename-speakers command implementation.

use crate::cli::Output;
use crate::preprocess::rename_speakers_in_file;
use anyhow::Result;
use std::path::Path;

/// Write a copy of `file` with the generic speaker labels replaced.
pub fn run_rename_speakers(file: &Path, host: &str, guest: &str) -> Result<()> {
    let output = rename_speakers_in_file(file, host, guest)?;
    Output::kv("[Speaker 1]", host);
    Output::kv("[Speaker 2]", guest);
    Output::success(&format!("Saved {}", output.display()));
    Ok(())
}
