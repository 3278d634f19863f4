//! CLI module for DataCommit.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DataCommit - ask the DataCommit podcast
///
/// Question answering over transcripts of the Turkish DataCommit podcast, plus
/// the tools used to build the transcript corpus.
#[derive(Parser, Debug)]
#[command(name = "datacommit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "DATACOMMIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check external tools, API keys and the index
    Doctor,

    /// Start the chat web server
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to PORT or the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Split, embed and store the episode transcripts
    Ingest {
        /// Delete the existing collection before ingesting
        #[arg(long)]
        reset: bool,
    },

    /// Ask a question from the terminal
    Ask {
        /// The question to ask
        question: String,

        /// Number of chunks to retrieve
        #[arg(short, long)]
        k: Option<usize>,

        /// Print the retrieved chunks
        #[arg(long)]
        show_chunks: bool,
    },

    /// Show the indexed episodes
    Status,

    /// Download an episode's audio from YouTube as MP3
    Download {
        /// Video URL
        url: String,

        /// Output directory (defaults to the configured download directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transcribe an audio file with Whisper
    Transcribe {
        /// Audio file to transcribe
        audio: PathBuf,

        /// Cluster segments into this many speakers
        #[arg(short, long)]
        speakers: Option<usize>,

        /// Output directory (defaults to the configured transcription directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean a speaker transcript with an LLM, resuming interrupted runs
    Clean {
        /// Transcript to clean
        input: PathBuf,

        /// Where to write the cleaned transcript
        output: PathBuf,
    },

    /// Replace [Speaker 1]/[Speaker 2] with real names
    RenameSpeakers {
        /// Transcript to rewrite
        file: PathBuf,

        /// Name for [Speaker 1]
        #[arg(long)]
        host: String,

        /// Name for [Speaker 2]
        #[arg(long)]
        guest: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
