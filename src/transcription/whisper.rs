//! OpenAI Whisper transcription implementation.

use super::{Transcriber, Transcript, TranscriptSegment};
use crate::audio::split_audio;
use crate::config::TranscriptionSettings;
use crate::error::{DataCommitError, Result};
use crate::openai::create_client;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, instrument};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: Option<String>,
    chunk_duration_seconds: u32,
    max_concurrent_chunks: usize,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber with default settings.
    pub fn new() -> Result<Self> {
        Self::from_settings(&TranscriptionSettings::default())
    }

    pub fn from_settings(settings: &TranscriptionSettings) -> Result<Self> {
        let mut transcriber = Self::with_config(
            &settings.model,
            settings.chunk_duration_seconds,
            settings.max_concurrent_chunks,
        )?;
        if !settings.language.is_empty() {
            transcriber.language = Some(settings.language.clone());
        }
        Ok(transcriber)
    }

    /// Create a new Whisper transcriber with custom configuration.
    pub fn with_config(
        model: &str,
        chunk_duration_seconds: u32,
        max_concurrent_chunks: usize,
    ) -> Result<Self> {
        if chunk_duration_seconds == 0 {
            return Err(DataCommitError::Config(
                "chunk_duration_seconds must be greater than 0".to_string(),
            ));
        }

        let client = create_client()?;

        Ok(Self {
            client,
            model: model.to_string(),
            language: None,
            chunk_duration_seconds,
            max_concurrent_chunks: max_concurrent_chunks.max(1),
        })
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path, language: Option<&str>) -> Result<Vec<TranscriptSegment>> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = language {
            request_builder.language(lang);
        }

        let request = request_builder.build()
            .map_err(|e| DataCommitError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self.client.audio().transcribe_verbose_json(request).await
            .map_err(|e| DataCommitError::OpenAI(format!("Whisper API error: {}", e)))?;

        let segments: Vec<TranscriptSegment> = response.segments
            .map(|segs| {
                segs.iter()
                    .map(|s| TranscriptSegment::new(
                        s.start as f64,
                        s.end as f64,
                        s.text.trim().to_string(),
                    ))
                    .collect()
            })
            .unwrap_or_else(|| {
                // No segment list, keep the whole text as one segment
                vec![TranscriptSegment::new(
                    0.0,
                    response.duration as f64,
                    response.text.trim().to_string(),
                )]
            });

        debug!("Transcribed {} segments", segments.len());
        Ok(segments)
    }

    /// Transcribe an audio file, splitting if necessary.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_with_splitting(
        &self,
        audio_path: &Path,
        language: Option<&str>,
        name: &str,
    ) -> Result<Transcript> {
        let temp_dir = tempfile::tempdir()?;
        let chunks = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        if chunks.len() == 1 {
            let segments = self.transcribe_single(audio_path, language).await?;
            return Ok(Transcript::new(name.to_string(), segments));
        }

        let chunk_count = chunks.len();
        info!("Processing {} audio chunks with {}", chunk_count, self.model);

        let pb = ProgressBar::new(chunk_count as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("  {spinner:.green} Whisper   [{bar:30.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }

        // Fail fast: the first chunk error aborts the whole file
        let mut results: Vec<(usize, f64, Vec<TranscriptSegment>)> = Vec::with_capacity(chunk_count);

        let mut stream = stream::iter(chunks.into_iter().enumerate())
            .map(|(idx, (chunk_path, time_offset))| async move {
                let result = self.transcribe_single(&chunk_path, language).await;
                (idx, time_offset, result)
            })
            .buffer_unordered(self.max_concurrent_chunks);

        while let Some((idx, time_offset, result)) = stream.next().await {
            pb.inc(1);
            match result {
                Ok(segments) => results.push((idx, time_offset, segments)),
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(DataCommitError::Transcription(format!(
                        "Chunk {} at {:.0}s failed: {}",
                        idx, time_offset, e
                    )));
                }
            }
        }

        pb.finish_and_clear();

        results.sort_by_key(|(idx, _, _)| *idx);

        let mut all_segments = Vec::new();
        for (_, time_offset, mut segments) in results {
            for segment in &mut segments {
                segment.offset_by(time_offset);
            }
            all_segments.extend(segments);
        }

        Ok(Transcript::new(name.to_string(), all_segments))
    }
}

fn stem_of(audio_path: &Path) -> String {
    audio_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        self.transcribe_with_splitting(audio_path, self.language.as_deref(), &stem_of(audio_path))
            .await
    }

    async fn transcribe_with_language(&self, audio_path: &Path, language: &str) -> Result<Transcript> {
        self.transcribe_with_splitting(audio_path, Some(language), &stem_of(audio_path))
            .await
    }
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_of() {
        assert_eq!(stem_of(Path::new("audio/datacommit_8_goker_guner.mp3")), "datacommit_8_goker_guner");
    }

    #[test]
    fn test_zero_chunk_duration_rejected() {
        let settings = TranscriptionSettings {
            chunk_duration_seconds: 0,
            ..TranscriptionSettings::default()
        };
        assert!(matches!(
            WhisperTranscriber::from_settings(&settings),
            Err(DataCommitError::Config(_))
        ));
    }

    #[test]
    fn test_api_key_check() {
        let _ = is_api_key_configured();
    }
}
