//! Transcribe command implementation.

use crate::audio::{decode_pcm, PCM_SAMPLE_RATE};
use crate::cli::output::format_duration;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::preprocess::{assign_speakers, format_grouped, format_with_speakers};
use crate::transcription::{write_output, write_transcript, OutputKind, Transcriber, WhisperTranscriber};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Transcribe `audio`, optionally clustering the segments into speakers.
pub async fn run_transcribe(
    audio: &Path,
    speakers: Option<usize>,
    output: Option<PathBuf>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Transcribe, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'datacommit doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if !audio.exists() {
        anyhow::bail!("Audio file not found: {}", audio.display());
    }

    let output_dir = output.unwrap_or_else(|| Settings::expand_path(&settings.transcription.output_dir));
    let transcriber = WhisperTranscriber::from_settings(&settings.transcription)?;

    Output::info(&format!(
        "Transcribing {} with {}",
        audio.display(),
        settings.transcription.model
    ));
    let transcript = transcriber.transcribe(audio).await?;

    let (full, timestamps) = write_transcript(&transcript, &output_dir)?;
    Output::kv("Segments", &transcript.segments.len().to_string());
    Output::kv("Duration", &format_duration(transcript.duration_seconds));
    Output::success(&format!("Full transcription saved to: {}", full.display()));
    Output::success(&format!("Timestamped transcription saved to: {}", timestamps.display()));

    let Some(n_speakers) = speakers else {
        return Ok(());
    };

    let spinner = Output::spinner(&format!("Clustering into {} speakers...", n_speakers));
    let pcm = decode_pcm(audio).await;
    let labelled = pcm.and_then(|pcm| {
        assign_speakers(&pcm, PCM_SAMPLE_RATE, &transcript.segments, n_speakers)
    });
    spinner.finish_and_clear();
    let labelled = labelled?;

    let detailed = write_output(
        &output_dir,
        &transcript.name,
        OutputKind::WithSpeakers,
        &format_with_speakers(&labelled),
    )?;
    let grouped = write_output(
        &output_dir,
        &transcript.name,
        OutputKind::Speakers,
        &format_grouped(&labelled),
    )?;

    let distinct = labelled.iter().map(|s| s.speaker).max().map_or(0, |m| m + 1);
    Output::kv("Speakers", &distinct.to_string());
    Output::success(&format!("Transcription with speakers (detailed) saved to: {}", detailed.display()));
    Output::success(&format!("Transcription with speakers (grouped) saved to: {}", grouped.display()));

    Ok(())
}
