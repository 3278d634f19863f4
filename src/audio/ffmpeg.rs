//! ffmpeg/ffprobe helpers: splitting long recordings and decoding PCM.

use crate::error::{DataCommitError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Sample rate used for decoded PCM.
pub const PCM_SAMPLE_RATE: u32 = 16_000;

fn tool_error(tool: &str, e: std::io::Error) -> DataCommitError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DataCommitError::ToolNotFound(tool.into())
    } else {
        DataCommitError::ToolFailed(format!("{tool} error: {e}"))
    }
}

/// Segments a long audio file into smaller chunks for transcription.
///
/// Returns `(chunk_path, offset_seconds)` for each segment. Audio shorter than
/// `chunk_seconds` is returned as-is.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    if chunk_seconds == 0 {
        return Err(DataCommitError::Config(
            "chunk_duration_seconds must be greater than 0".to_string(),
        ));
    }

    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = chunk_seconds as f64;

    if total_duration <= chunk_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut segments = Vec::new();
    let mut offset = 0.0;
    let mut idx = 0u32;

    while offset < total_duration {
        let segment_path = output_dir.join(format!("{}_{:04}.mp3", base_name, idx));
        let segment_len = chunk_len.min(total_duration - offset);

        extract_segment(source, &segment_path, offset, segment_len).await?;

        debug!("Created segment {} at offset {:.1}s", idx, offset);
        segments.push((segment_path, offset));

        offset += chunk_len;
        idx += 1;
    }

    info!("Created {} audio segments", segments.len());
    Ok(segments)
}

/// Extracts a time segment from an audio file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    // Stream copy first, it keeps the original encoding
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    warn!("Stream copy failed, re-encoding segment");

    let output = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| tool_error("ffmpeg", e))?;

    if !output.status.success() {
        let err = String::from_utf8_lossy(&output.stderr);
        return Err(DataCommitError::ToolFailed(format!("Segment extraction failed: {err}")));
    }
    Ok(())
}

/// Queries the duration of an audio file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await
        .map_err(|e| tool_error("ffprobe", e))?;

    if !output.status.success() {
        return Err(DataCommitError::ToolFailed("ffprobe returned error".into()));
    }

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|_| DataCommitError::ToolFailed("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| DataCommitError::ToolFailed("Could not determine audio duration".into()))
}

/// Decode an audio file to mono 32-bit float PCM at [`PCM_SAMPLE_RATE`].
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn decode_pcm(path: &Path) -> Result<Vec<f32>> {
    let output = Command::new("ffmpeg")
        .arg("-i").arg(path)
        .arg("-vn")
        .arg("-ac").arg("1")
        .arg("-ar").arg(PCM_SAMPLE_RATE.to_string())
        .arg("-f").arg("f32le")
        .arg("-loglevel").arg("error")
        .arg("pipe:1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| tool_error("ffmpeg", e))?;

    if !output.status.success() {
        let err = String::from_utf8_lossy(&output.stderr);
        return Err(DataCommitError::ToolFailed(format!("PCM decoding failed: {err}")));
    }

    let samples = pcm_from_bytes(&output.stdout);
    debug!("Decoded {} samples", samples.len());
    Ok(samples)
}

fn pcm_from_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_from_bytes() {
        let bytes: Vec<u8> = [0.5f32, -1.0, 0.25]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .chain([0u8, 1]) // trailing partial sample is ignored
            .collect();

        assert_eq!(pcm_from_bytes(&bytes), vec![0.5, -1.0, 0.25]);
    }

    #[tokio::test]
    async fn test_zero_chunk_length_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = split_audio(Path::new("episode.mp3"), dir.path(), 0).await;
        assert!(matches!(result, Err(DataCommitError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let result = probe_duration(Path::new("/nonexistent/episode.mp3")).await;
        assert!(result.is_err());
    }
}
