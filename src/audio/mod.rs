//! Audio acquisition and processing through external tools.
//!
//! `yt-dlp` fetches episode audio, `ffmpeg`/`ffprobe` split and decode it.

mod downloader;
mod ffmpeg;

pub use downloader::{download_youtube_audio, fetch_title, remove_part_files, DownloadedAudio};
pub use ffmpeg::{decode_pcm, probe_duration, split_audio, PCM_SAMPLE_RATE};
