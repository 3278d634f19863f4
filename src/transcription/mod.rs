//! Speech-to-text for episode audio.
//!
//! Long recordings are split with ffmpeg and sent to the Whisper API in
//! parallel; segment timestamps are shifted back onto the original timeline.

mod format;
mod models;
mod whisper;

pub use format::{format_timestamps, write_output, write_transcript, OutputKind};
pub use models::{Transcript, TranscriptSegment};
pub use whisper::{is_api_key_configured, WhisperTranscriber};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file and return segments with timestamps.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;

    /// Transcribe an audio file with a specific language hint.
    async fn transcribe_with_language(
        &self,
        audio_path: &Path,
        language: &str,
    ) -> Result<Transcript>;
}
