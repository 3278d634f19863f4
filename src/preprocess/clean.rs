//! LLM-based transcript cleaning.
//!
//! The transcript is cut into fixed-size line chunks that are cleaned one at a
//! time. Each request carries the tail of the already-cleaned text so speaker
//! labels stay consistent across chunk boundaries. Output and a small progress
//! record are written after every chunk, so an interrupted run can resume.

use crate::config::{CleanupPrompts, CleanupSettings, Prompts};
use crate::error::{DataCommitError, Result};
use crate::generation::{GenerationOptions, Generator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Split `content` into chunks of `lines_per_chunk` lines.
pub fn chunk_lines(content: &str, lines_per_chunk: usize) -> Vec<String> {
    let lines: Vec<&str> = content.trim().split('\n').collect();
    lines
        .chunks(lines_per_chunk.max(1))
        .map(|c| c.join("\n"))
        .collect()
}

/// The last `n` lines of `text`.
pub fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim().split('\n').collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// Resume record stored beside the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanProgress {
    pub input: String,
    pub input_bytes: u64,
    pub lines_per_chunk: usize,
    pub total_chunks: usize,
    pub completed_chunks: usize,
}

impl CleanProgress {
    /// `<output>.progress.json`
    pub fn path_for(output: &Path) -> PathBuf {
        let mut name = output.as_os_str().to_owned();
        name.push(".progress.json");
        PathBuf::from(name)
    }

    fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn matches(&self, other: &CleanProgress) -> bool {
        self.input == other.input
            && self.input_bytes == other.input_bytes
            && self.lines_per_chunk == other.lines_per_chunk
            && self.total_chunks == other.total_chunks
    }
}

/// Summary of a cleaning run.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    pub total_chunks: usize,
    /// Chunks skipped because an earlier run already cleaned them.
    pub resumed_from: usize,
    pub cleaned_chunks: usize,
    pub output: PathBuf,
}

/// Cleans transcripts chunk by chunk with a hosted model.
pub struct TranscriptCleaner {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    options: GenerationOptions,
    lines_per_chunk: usize,
    context_lines: usize,
    delay: Duration,
}

impl TranscriptCleaner {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self::from_settings(generator, &CleanupSettings::default(), Prompts::default())
    }

    pub fn from_settings(
        generator: Arc<dyn Generator>,
        settings: &CleanupSettings,
        prompts: Prompts,
    ) -> Self {
        Self {
            generator,
            prompts,
            options: GenerationOptions {
                temperature: settings.temperature,
                top_p: settings.top_p,
                thinking_budget: None,
            },
            lines_per_chunk: settings.lines_per_chunk,
            context_lines: settings.context_lines,
            delay: Duration::from_secs_f64(settings.delay_seconds.max(0.0)),
        }
    }

    fn cleanup_prompts(&self) -> &CleanupPrompts {
        &self.prompts.cleanup
    }

    /// Render the request for one chunk.
    pub fn build_prompt(&self, chunk: &str, previous_context: &str, is_first_chunk: bool) -> String {
        let prompts = self.cleanup_prompts();

        let mut vars = HashMap::new();
        vars.insert("system".to_string(), prompts.system.clone());
        vars.insert("previous_context".to_string(), previous_context.to_string());
        vars.insert("chunk".to_string(), chunk.to_string());
        vars.insert(
            "first_chunk_instruction".to_string(),
            if is_first_chunk {
                prompts.first_chunk.clone()
            } else {
                String::new()
            },
        );

        self.prompts.render_with_custom(&prompts.user, &vars)
    }

    /// Clean `input` into `output`, resuming from a matching progress record.
    ///
    /// `on_chunk` is called with `(completed, total)` after every chunk.
    #[instrument(skip(self, on_chunk), fields(input = %input.display()))]
    pub async fn clean_file<F>(&self, input: &Path, output: &Path, mut on_chunk: F) -> Result<CleanReport>
    where
        F: FnMut(usize, usize),
    {
        let content = std::fs::read_to_string(input)?;
        let chunks = chunk_lines(&content, self.lines_per_chunk);
        let total = chunks.len();
        info!("Split into {} chunks for processing", total);

        let progress_path = CleanProgress::path_for(output);
        let mut progress = CleanProgress {
            input: input.to_string_lossy().into_owned(),
            input_bytes: content.len() as u64,
            lines_per_chunk: self.lines_per_chunk,
            total_chunks: total,
            completed_chunks: 0,
        };

        let mut cleaned = String::new();
        if let Some(saved) = CleanProgress::load(&progress_path) {
            if saved.matches(&progress) && output.exists() {
                cleaned = std::fs::read_to_string(output)?;
                progress.completed_chunks = saved.completed_chunks.min(total);
                info!("Resuming after chunk {}/{}", progress.completed_chunks, total);
            } else {
                warn!("Progress file does not match the input, starting over");
            }
        }

        let resumed_from = progress.completed_chunks;

        for (i, chunk) in chunks.iter().enumerate().skip(resumed_from) {
            debug!("Processing chunk {}/{}", i + 1, total);

            let previous_context = last_lines(&cleaned, self.context_lines);
            let prompt = self.build_prompt(chunk, &previous_context, i == 0);

            let cleaned_chunk = self
                .generator
                .generate(&prompt, &self.options)
                .await
                .map_err(|e| DataCommitError::Cleaning {
                    chunk: i + 1,
                    total,
                    message: e.to_string(),
                })?;

            cleaned.push_str(cleaned_chunk.trim());
            cleaned.push_str("\n\n");

            std::fs::write(output, &cleaned)?;
            progress.completed_chunks = i + 1;
            progress.save(&progress_path)?;
            on_chunk(i + 1, total);

            if i + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!("Cleaning complete, output saved to {:?}", output);

        Ok(CleanReport {
            total_chunks: total,
            resumed_from,
            cleaned_chunks: total - resumed_from,
            output: output.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubGenerator;

    fn numbered_lines(n: usize) -> String {
        (1..=n).map(|i| format!("[Speaker 1]: satır {}", i)).collect::<Vec<_>>().join("\n")
    }

    fn cleaner(generator: Arc<StubGenerator>, lines_per_chunk: usize) -> TranscriptCleaner {
        let settings = CleanupSettings {
            lines_per_chunk,
            context_lines: 2,
            delay_seconds: 0.0,
            ..CleanupSettings::default()
        };
        TranscriptCleaner::from_settings(generator, &settings, Prompts::default())
    }

    #[test]
    fn test_chunk_lines() {
        let chunks = chunk_lines(&numbered_lines(90), 40);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].lines().count(), 40);
        assert_eq!(chunks[2].lines().count(), 10);
        assert!(chunks[2].ends_with("satır 90"));

        assert_eq!(chunk_lines("\n\ntek satır\n", 40), vec!["tek satır"]);
    }

    #[test]
    fn test_last_lines() {
        assert_eq!(last_lines("a\nb\nc\n\n", 2), "b\nc");
        assert_eq!(last_lines("a", 10), "a");
        assert_eq!(last_lines("", 10), "");
    }

    #[test]
    fn test_first_chunk_instruction_only_on_first() {
        let cleaner = TranscriptCleaner::new(Arc::new(StubGenerator::new("x")));

        let first = cleaner.build_prompt("metin", "", true);
        let later = cleaner.build_prompt("metin", "önceki", false);

        assert!(first.contains("SPECIAL INSTRUCTION FOR FIRST CHUNK"));
        assert!(!later.contains("SPECIAL INSTRUCTION FOR FIRST CHUNK"));
        assert!(later.contains("Previous context (for continuity):\nönceki"));
        assert!(later.contains("Current transcript to clean:\nmetin"));
        assert!(!later.contains("{{"));
    }

    #[tokio::test]
    async fn test_clean_file_writes_output_and_progress() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ep.txt");
        let output = dir.path().join("ep_cleaned.txt");
        std::fs::write(&input, numbered_lines(9)).unwrap();

        let generator = Arc::new(StubGenerator::new("  [Speaker 1]: Temiz metin.  "));
        let mut seen = Vec::new();
        let report = cleaner(generator.clone(), 4)
            .clean_file(&input, &output, |done, total| seen.push((done, total)))
            .await
            .unwrap();

        assert_eq!(report.total_chunks, 3);
        assert_eq!(report.cleaned_chunks, 3);
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(generator.calls(), 3);

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, "[Speaker 1]: Temiz metin.\n\n".repeat(3));

        let prompts = generator.prompts();
        assert!(prompts[1].contains("Previous context (for continuity):\n[Speaker 1]: Temiz metin."));

        let progress = CleanProgress::load(&CleanProgress::path_for(&output)).unwrap();
        assert_eq!(progress.completed_chunks, 3);

        // finished job: rerun is a no-op
        let rerun = cleaner(generator.clone(), 4)
            .clean_file(&input, &output, |_, _| {})
            .await
            .unwrap();
        assert_eq!(rerun.cleaned_chunks, 0);
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_progress_and_resume_continues() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ep.txt");
        let output = dir.path().join("ep_cleaned.txt");
        std::fs::write(&input, numbered_lines(8)).unwrap();

        // first run: one chunk done, then simulate an interruption
        let ok = Arc::new(StubGenerator::new("parça"));
        cleaner(ok, 4).clean_file(&input, &output, |_, _| {}).await.unwrap();
        let mut progress = CleanProgress::load(&CleanProgress::path_for(&output)).unwrap();
        progress.completed_chunks = 1;
        progress.save(&CleanProgress::path_for(&output)).unwrap();
        std::fs::write(&output, "parça\n\n").unwrap();

        let failing = Arc::new(StubGenerator::failing());
        let err = tokio_test::assert_err!(
            cleaner(failing, 4).clean_file(&input, &output, |_, _| {}).await
        );
        assert!(matches!(err, DataCommitError::Cleaning { chunk: 2, total: 2, .. }));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "parça\n\n");

        let resumed = Arc::new(StubGenerator::new("ikinci"));
        let report = tokio_test::assert_ok!(
            cleaner(resumed.clone(), 4).clean_file(&input, &output, |_, _| {}).await
        );

        assert_eq!(report.resumed_from, 1);
        assert_eq!(resumed.calls(), 1);
        assert!(!resumed.prompts()[0].contains("SPECIAL INSTRUCTION FOR FIRST CHUNK"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "parça\n\nikinci\n\n");
    }

    #[tokio::test]
    async fn test_changed_input_starts_over() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ep.txt");
        let output = dir.path().join("ep_cleaned.txt");
        std::fs::write(&input, numbered_lines(4)).unwrap();

        let generator = Arc::new(StubGenerator::new("a"));
        cleaner(generator.clone(), 4).clean_file(&input, &output, |_, _| {}).await.unwrap();

        std::fs::write(&input, numbered_lines(6)).unwrap();
        let report = cleaner(generator.clone(), 4)
            .clean_file(&input, &output, |_, _| {})
            .await
            .unwrap();

        assert_eq!(report.resumed_from, 0);
        assert_eq!(generator.calls(), 3);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "a\n\na\n\n");
    }
}
