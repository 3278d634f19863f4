//! Lightweight speaker clustering over transcript segments.
//!
//! Each timed segment is turned into an acoustic feature vector, the vectors
//! are standardized, and k-means groups them into the requested number of
//! speakers. There is no voice model involved; this works for two clearly
//! different voices and not much more.

mod features;
mod kmeans;

pub use features::{FeatureExtractor, FEATURE_LEN};
pub use kmeans::{standardize, KMeans};

use crate::error::Result;
use crate::transcription::TranscriptSegment;
use tracing::{info, instrument, warn};

/// A transcript segment with a zero-based speaker index.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerSegment {
    pub speaker: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

fn sample_range(segment: &TranscriptSegment, sample_rate: u32, len: usize) -> (usize, usize) {
    let to_index = |t: f64| ((t.max(0.0) * sample_rate as f64) as usize).min(len);
    (to_index(segment.start_seconds), to_index(segment.end_seconds))
}

/// Label each segment with one of `n_speakers` speakers.
///
/// Segments too short to measure are dropped from the result. When fewer
/// usable segments remain than speakers requested, all of them are speaker 0.
#[instrument(skip_all, fields(segments = segments.len(), n_speakers = n_speakers))]
pub fn assign_speakers(
    pcm: &[f32],
    sample_rate: u32,
    segments: &[TranscriptSegment],
    n_speakers: usize,
) -> Result<Vec<SpeakerSegment>> {
    let extractor = FeatureExtractor::new(sample_rate);

    let mut rows = Vec::new();
    let mut valid = Vec::new();
    for segment in segments {
        let (start, end) = sample_range(segment, sample_rate, pcm.len());
        if end <= start {
            continue;
        }
        if let Some(features) = extractor.extract(&pcm[start..end]) {
            rows.push(features.into_iter().map(f64::from).collect::<Vec<f64>>());
            valid.push(segment);
        }
    }

    info!("Extracted features from {}/{} segments", valid.len(), segments.len());

    let speakers = if rows.len() < n_speakers.max(1) {
        warn!(
            "Not enough segments ({}) for {} speakers, using a single speaker",
            rows.len(),
            n_speakers
        );
        vec![0; rows.len()]
    } else {
        standardize(&mut rows);
        let labels = KMeans::new(n_speakers).fit_predict(&rows)?;
        let distinct = labels.iter().max().map_or(0, |m| m + 1);
        info!("Identified {} speakers", distinct);
        labels
    };

    Ok(valid
        .into_iter()
        .zip(speakers)
        .map(|(segment, speaker)| SpeakerSegment {
            speaker,
            start_seconds: segment.start_seconds,
            end_seconds: segment.end_seconds,
            text: segment.text.trim().to_string(),
        })
        .collect())
}

/// One line per segment: `[Speaker 1] [0.00s - 4.20s] text`.
pub fn format_with_speakers(segments: &[SpeakerSegment]) -> String {
    segments
        .iter()
        .map(|s| {
            format!(
                "[Speaker {}] [{:.2}s - {:.2}s] {}\n",
                s.speaker + 1,
                s.start_seconds,
                s.end_seconds,
                s.text
            )
        })
        .collect()
}

/// Consecutive segments of the same speaker joined into one block.
pub fn format_grouped(segments: &[SpeakerSegment]) -> String {
    let mut groups: Vec<(usize, Vec<&str>)> = Vec::new();
    for segment in segments {
        if let Some((speaker, texts)) = groups.last_mut() {
            if *speaker == segment.speaker {
                texts.push(&segment.text);
                continue;
            }
        }
        groups.push((segment.speaker, vec![segment.text.as_str()]));
    }

    groups
        .iter()
        .map(|(speaker, texts)| format!("\n[Speaker {}]:\n{}\n", speaker + 1, texts.join(" ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const SR: u32 = 16_000;

    fn seg(speaker: usize, start: f64, end: f64, text: &str) -> SpeakerSegment {
        SpeakerSegment {
            speaker,
            start_seconds: start,
            end_seconds: end,
            text: text.to_string(),
        }
    }

    fn tone(freq: f32, seconds: f32) -> Vec<f32> {
        (0..(seconds * SR as f32) as usize)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / SR as f32).sin())
            .collect()
    }

    #[test]
    fn test_format_with_speakers() {
        let text = format_with_speakers(&[seg(0, 0.0, 4.2, "Merhaba"), seg(1, 4.2, 7.5, "Selam")]);
        assert_eq!(
            text,
            "[Speaker 1] [0.00s - 4.20s] Merhaba\n[Speaker 2] [4.20s - 7.50s] Selam\n"
        );
    }

    #[test]
    fn test_format_grouped() {
        let text = format_grouped(&[
            seg(0, 0.0, 1.0, "Hoş"),
            seg(0, 1.0, 2.0, "geldiniz."),
            seg(1, 2.0, 3.0, "Teşekkürler."),
            seg(0, 3.0, 4.0, "Başlayalım."),
        ]);
        assert_eq!(
            text,
            "\n[Speaker 1]:\nHoş geldiniz.\n\n[Speaker 2]:\nTeşekkürler.\n\n[Speaker 1]:\nBaşlayalım.\n"
        );
        assert_eq!(format_grouped(&[]), "");
    }

    #[test]
    fn test_assign_two_voices() {
        // alternating low and high tones, one second each
        let mut pcm = Vec::new();
        let mut segments = Vec::new();
        for i in 0..6 {
            let freq = if i % 2 == 0 { 180.0 } else { 2400.0 };
            pcm.extend(tone(freq, 1.0));
            segments.push(TranscriptSegment::new(i as f64, i as f64 + 1.0, format!(" cümle {} ", i)));
        }

        let labelled = assign_speakers(&pcm, SR, &segments, 2).unwrap();

        assert_eq!(labelled.len(), 6);
        let speakers: Vec<usize> = labelled.iter().map(|s| s.speaker).collect();
        assert_eq!(speakers, vec![0, 1, 0, 1, 0, 1]);
        assert_eq!(labelled[0].text, "cümle 0");
    }

    #[test]
    fn test_short_segments_skipped_and_single_speaker_fallback() {
        let pcm = tone(200.0, 1.0);
        let segments = vec![
            TranscriptSegment::new(0.0, 0.01, "çok kısa".to_string()),
            TranscriptSegment::new(0.1, 0.9, "yeterli".to_string()),
            TranscriptSegment::new(5.0, 6.0, "ses dışında".to_string()),
        ];

        let labelled = assign_speakers(&pcm, SR, &segments, 2).unwrap();

        assert_eq!(labelled.len(), 1);
        assert_eq!(labelled[0].speaker, 0);
        assert_eq!(labelled[0].text, "yeterli");
    }
}
