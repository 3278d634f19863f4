//! Episode audio download via yt-dlp.

use crate::error::{DataCommitError, Result};
use crate::preprocess::sanitize_filename;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

const EXTRACTOR_ARGS: &str = "youtube:player_client=android,web";

/// A downloaded episode.
#[derive(Debug, Clone)]
pub struct DownloadedAudio {
    /// Title as published.
    pub title: String,
    /// File stem derived from the title.
    pub file_stem: String,
    pub path: PathBuf,
}

async fn run_yt_dlp(args: &[&str]) -> Result<std::process::Output> {
    let result = Command::new("yt-dlp")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DataCommitError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(DataCommitError::AudioDownload(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DataCommitError::AudioDownload(format!("yt-dlp failed: {stderr}")));
    }

    Ok(output)
}

/// Look up a video's title without downloading it.
#[instrument]
pub async fn fetch_title(url: &str) -> Result<String> {
    let output = run_yt_dlp(&[
        "--dump-json",
        "--no-playlist",
        "--no-warnings",
        "--no-check-certificate",
        "--extractor-args",
        EXTRACTOR_ARGS,
        url,
    ])
    .await?;

    let info: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|_| DataCommitError::AudioDownload("Invalid yt-dlp metadata".into()))?;

    Ok(info["title"].as_str().unwrap_or("video").to_string())
}

/// Download the best audio stream of `url` as MP3, named after its sanitized title.
#[instrument(skip(output_dir))]
pub async fn download_youtube_audio(url: &str, output_dir: &Path) -> Result<DownloadedAudio> {
    std::fs::create_dir_all(output_dir)?;

    let title = fetch_title(url).await?;
    let mut file_stem = sanitize_filename(&title);
    if file_stem.is_empty() {
        file_stem = "video".to_string();
    }
    info!("Original title: {}", title);
    info!("Sanitized title: {}", file_stem);

    let template = output_dir.join(format!("{}.%(ext)s", file_stem));
    let template = template.to_string_lossy();

    run_yt_dlp(&[
        "--format",
        "bestaudio/best",
        "--extract-audio",
        "--audio-format",
        "mp3",
        "--audio-quality",
        "192K",
        "--no-part",
        "--no-playlist",
        "--no-check-certificate",
        "--extractor-args",
        EXTRACTOR_ARGS,
        "--quiet",
        "--no-warnings",
        "--output",
        &template,
        url,
    ])
    .await?;

    let removed = remove_part_files(output_dir);
    if removed > 0 {
        debug!("Removed {} partial files", removed);
    }

    let path = output_dir.join(format!("{}.mp3", file_stem));
    if !path.exists() {
        return Err(DataCommitError::AudioDownload(
            "Audio file not found after download".into(),
        ));
    }

    Ok(DownloadedAudio {
        title,
        file_stem,
        path,
    })
}

/// Delete leftover `*.part` files in `dir`. Returns how many were removed.
pub fn remove_part_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "part") {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove {:?}: {}", path, e),
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_part_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bolum.mp3.part"), b"x").unwrap();
        std::fs::write(dir.path().join("bolum.webm.part"), b"x").unwrap();
        std::fs::write(dir.path().join("bolum.mp3"), b"x").unwrap();

        assert_eq!(remove_part_files(dir.path()), 2);
        assert!(dir.path().join("bolum.mp3").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_remove_part_files_missing_dir() {
        assert_eq!(remove_part_files(Path::new("/nonexistent/datacommit")), 0);
    }
}
