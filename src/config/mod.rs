//! Configuration module for DataCommit.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{CleanupPrompts, Prompts, RagPrompts};
pub use settings::{
    CleanupSettings, CorpusSettings, DownloadSettings, EmbeddingSettings, EpisodeSettings,
    GeneralSettings, GenerationProvider, HostSettings, PromptSettings, RagSettings,
    ServerSettings, Settings, SplitterSettings, TranscriptionSettings, VectorStoreSettings,
};
