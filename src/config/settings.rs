//! Configuration settings for DataCommit.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub corpus: CorpusSettings,
    pub splitter: SplitterSettings,
    pub rag: RagSettings,
    pub server: ServerSettings,
    pub transcription: TranscriptionSettings,
    pub cleanup: CleanupSettings,
    pub download: DownloadSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.datacommit".to_string(),
            temp_dir: "/tmp/datacommit".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding generation settings.
///
/// Ingestion and querying must use the same model and dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Path to the SQLite database.
    pub sqlite_path: String,
    /// Collection the corpus chunks are written to and read from.
    pub collection: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.datacommit/vectors.db".to_string(),
            collection: "datacommit_all".to_string(),
        }
    }
}

/// One podcast episode of the corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeSettings {
    /// Episode number.
    pub episode: u32,
    /// Guest display name.
    pub guest: String,
    /// Cleaned, speaker-named transcript file name (relative to the transcripts dir).
    pub file: String,
    /// Guest portrait file name served from the static directory.
    pub image: String,
    /// Episode video URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
}

impl EpisodeSettings {
    fn new(episode: u32, guest: &str, slug: &str, youtube_id: &str) -> Self {
        Self {
            episode,
            guest: guest.to_string(),
            file: format!("datacommit_{}_{}_speakers_cleaned_named.txt", episode, slug),
            image: format!("{}.jpg", slug),
            youtube_url: Some(format!("https://www.youtube.com/watch?v={}", youtube_id)),
        }
    }
}

/// The podcast host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    pub name: String,
    pub image: String,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            name: "Enes Fehmi Manan".to_string(),
            image: "enes_fehmi_manan.jpg".to_string(),
        }
    }
}

/// Corpus layout: where transcripts live and which episodes exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// Directory holding the final transcript files.
    pub transcripts_dir: String,
    /// Podcast host.
    pub host: HostSettings,
    /// Episode roster, in episode order.
    pub episodes: Vec<EpisodeSettings>,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            transcripts_dir: "data/Final".to_string(),
            host: HostSettings::default(),
            episodes: vec![
                EpisodeSettings::new(1, "Kaan Bıçakçı", "kaan_bicakci", "pu5tuQshGoU"),
                EpisodeSettings::new(2, "Bilge Yücel", "bilge_yucel", "UCpZJwb8UAY"),
                EpisodeSettings::new(3, "Alara Dirik", "alara_dirik", "fGEApsNKKw0"),
                EpisodeSettings::new(4, "Olgun Aydın", "olgun_aydin", "yhTxZr_bmDU"),
                EpisodeSettings::new(5, "Eren Akbaba", "eren_akbaba", "wusMEw9WOK4"),
                EpisodeSettings::new(6, "Taner Sekmen", "taner_sekmen", "63p7xIY_lgw"),
                EpisodeSettings::new(7, "Murat Şahin", "murat_sahin", "phQgJmz0KU4"),
                EpisodeSettings::new(8, "Göker Güner", "goker_guner", "kTR9E1ahVcc"),
            ],
        }
    }
}

/// Word-window splitting used at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterSettings {
    /// Words per chunk.
    pub split_length: usize,
    /// Words shared by adjacent chunks.
    pub split_overlap: usize,
    /// Trailing windows shorter than this are merged into the previous chunk.
    pub split_threshold: usize,
}

impl Default for SplitterSettings {
    fn default() -> Self {
        Self {
            split_length: 800,
            split_overlap: 200,
            split_threshold: 10,
        }
    }
}

/// Hosted generation provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// Google Gemini REST API (default).
    #[default]
    Gemini,
    /// OpenAI chat completions.
    OpenAI,
}

impl std::str::FromStr for GenerationProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(GenerationProvider::Gemini),
            "openai" => Ok(GenerationProvider::OpenAI),
            _ => Err(format!("Unknown generation provider: {}", s)),
        }
    }
}

impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationProvider::Gemini => write!(f, "gemini"),
            GenerationProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// RAG (Retrieval-Augmented Generation) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Generation provider.
    pub provider: GenerationProvider,
    /// Model used for answer generation.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Thinking token budget (Gemini only). Zero disables thinking.
    pub thinking_budget: Option<u32>,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Base URL of the Gemini REST API.
    pub gemini_base_url: String,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::Gemini,
            model: "gemini-3-flash-preview".to_string(),
            temperature: 0.5,
            thinking_budget: Some(0),
            top_k: 5,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind. Overridden by the `PORT` environment variable.
    pub port: u16,
    /// Directory holding `index.html` and the static assets.
    pub static_dir: String,
    /// Image used for sources whose episode is not in the roster.
    pub default_image: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: "static".to_string(),
            default_image: "default.jpg".to_string(),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Spoken language hint.
    pub language: String,
    /// Duration in seconds for splitting long audio files.
    pub chunk_duration_seconds: u32,
    /// Maximum concurrent chunk processing.
    pub max_concurrent_chunks: usize,
    /// Output directory for transcripts.
    pub output_dir: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: "tr".to_string(),
            chunk_duration_seconds: 600,
            max_concurrent_chunks: 3,
            output_dir: "transcriptions".to_string(),
        }
    }
}

/// LLM transcript cleaning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Generation provider.
    pub provider: GenerationProvider,
    /// Model used for cleaning.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling.
    pub top_p: Option<f32>,
    /// Transcript lines sent per request.
    pub lines_per_chunk: usize,
    /// Lines of already cleaned output passed as context.
    pub context_lines: usize,
    /// Pause between requests, in seconds.
    pub delay_seconds: f64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::Gemini,
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.3,
            top_p: Some(0.95),
            lines_per_chunk: 40,
            context_lines: 10,
            delay_seconds: 4.5,
        }
    }
}

/// Audio download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Directory downloaded audio is written to.
    pub output_dir: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: "audio_downloads".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied after the file is read.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env()?;
        Ok(settings)
    }

    /// Apply process environment overrides.
    pub fn apply_env(&mut self) -> crate::error::Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                crate::error::DataCommitError::Config(format!("Invalid PORT value: {}", port))
            })?;
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datacommit")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Get the expanded transcripts directory.
    pub fn transcripts_dir(&self) -> PathBuf {
        Self::expand_path(&self.corpus.transcripts_dir)
    }

    /// Get the expanded static assets directory.
    pub fn static_dir(&self) -> PathBuf {
        Self::expand_path(&self.server.static_dir)
    }
}
