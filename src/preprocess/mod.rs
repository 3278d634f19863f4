//! Corpus preparation tools: download naming, speaker clustering, LLM
//! cleanup and speaker renaming.

mod clean;
pub mod diarize;
mod rename;
mod sanitize;

pub use clean::{chunk_lines, last_lines, CleanProgress, CleanReport, TranscriptCleaner};
pub use diarize::{assign_speakers, format_grouped, format_with_speakers, SpeakerSegment};
pub use rename::{named_output_path, rename_speakers, rename_speakers_in_file};
pub use sanitize::sanitize_filename;
