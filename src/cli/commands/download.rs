//! Download command implementation.

use crate::audio::download_youtube_audio;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Download one episode's audio as MP3.
pub async fn run_download(url: &str, output: Option<PathBuf>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Download, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let output_dir = output.unwrap_or_else(|| Settings::expand_path(&settings.download.output_dir));

    let spinner = Output::spinner("Downloading audio...");
    let result = download_youtube_audio(url, &output_dir).await;
    spinner.finish_and_clear();

    let audio = result?;
    Output::kv("Title", &audio.title);
    Output::kv("File name", &audio.file_stem);
    Output::success(&format!("Saved {}", audio.path.display()));
    Ok(())
}
