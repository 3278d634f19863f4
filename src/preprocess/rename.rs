//! Replace generic speaker labels with real names.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Replace `[Speaker 1]` with the host and `[Speaker 2]` with the guest.
pub fn rename_speakers(content: &str, host: &str, guest: &str) -> String {
    content
        .replace("[Speaker 1]", &format!("[{}]", host))
        .replace("[Speaker 2]", &format!("[{}]", guest))
}

/// `<base>_named<ext>` next to the input file.
pub fn named_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}_named.{}", stem, ext.to_string_lossy()),
        None => format!("{}_named", stem),
    };
    input.with_file_name(file_name)
}

/// Rename speakers in `input` and write the result beside it.
pub fn rename_speakers_in_file(input: &Path, host: &str, guest: &str) -> Result<PathBuf> {
    let content = std::fs::read_to_string(input)?;
    let output = named_output_path(input);
    std::fs::write(&output, rename_speakers(&content, host, guest))?;
    info!("Saved named transcript to {:?}", output);
    Ok(output)
}
