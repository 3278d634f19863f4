//! Transcript output files.
//!
//! A transcribed episode `<stem>` produces `<stem>_full.txt` with the plain
//! text and `<stem>_timestamps.txt` with one timed line per segment.

use super::Transcript;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Suffixes of the files written next to each other for one transcript.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputKind {
    Full,
    Timestamps,
    WithSpeakers,
    Speakers,
}

impl OutputKind {
    fn suffix(self) -> &'static str {
        match self {
            OutputKind::Full => "_full.txt",
            OutputKind::Timestamps => "_timestamps.txt",
            OutputKind::WithSpeakers => "_with_speakers.txt",
            OutputKind::Speakers => "_speakers.txt",
        }
    }

    /// `<output_dir>/<stem><suffix>`
    pub fn path(self, output_dir: &Path, stem: &str) -> PathBuf {
        output_dir.join(format!("{}{}", stem, self.suffix()))
    }
}

/// Timed lines: `[12.34s - 56.78s] text`.
pub fn format_timestamps(transcript: &Transcript) -> String {
    transcript
        .segments
        .iter()
        .map(|s| format!("[{:.2}s - {:.2}s] {}\n", s.start_seconds, s.end_seconds, s.text.trim()))
        .collect()
}

/// Write `content` as the `kind` file for `stem`, creating `output_dir` if needed.
pub fn write_output(output_dir: &Path, stem: &str, kind: OutputKind, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = kind.path(output_dir, stem);
    std::fs::write(&path, content)?;
    info!("Saved {:?}", path);
    Ok(path)
}

/// Write the full-text and timestamped files for `transcript`.
pub fn write_transcript(transcript: &Transcript, output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let full = write_output(output_dir, &transcript.name, OutputKind::Full, &transcript.full_text)?;
    let timestamps = write_output(
        output_dir,
        &transcript.name,
        OutputKind::Timestamps,
        &format_timestamps(transcript),
    )?;
    Ok((full, timestamps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::TranscriptSegment;

    fn sample_transcript() -> Transcript {
        Transcript::new(
            "datacommit_3".to_string(),
            vec![
                TranscriptSegment::new(0.0, 2.5, " Merhaba herkese.".to_string()),
                TranscriptSegment::new(2.5, 61.256, "Bugün konuğumuz var.".to_string()),
            ],
        )
    }

    #[test]
    fn test_format_timestamps() {
        assert_eq!(
            format_timestamps(&sample_transcript()),
            "[0.00s - 2.50s] Merhaba herkese.\n[2.50s - 61.26s] Bugün konuğumuz var.\n"
        );
    }

    #[test]
    fn test_output_paths() {
        let dir = Path::new("transcripts");
        assert_eq!(OutputKind::Full.path(dir, "ep"), dir.join("ep_full.txt"));
        assert_eq!(OutputKind::Speakers.path(dir, "ep"), dir.join("ep_speakers.txt"));
        assert_eq!(
            OutputKind::WithSpeakers.path(dir, "ep"),
            dir.join("ep_with_speakers.txt")
        );
    }

    #[test]
    fn test_write_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");

        let (full, timestamps) = write_transcript(&sample_transcript(), &out).unwrap();

        assert_eq!(full, out.join("datacommit_3_full.txt"));
        assert!(std::fs::read_to_string(full).unwrap().starts_with(" Merhaba herkese."));
        assert!(std::fs::read_to_string(timestamps)
            .unwrap()
            .contains("[2.50s - 61.26s]"));
    }
}
