//! RAG (Retrieval-Augmented Generation) over the podcast transcripts.
//!
//! Questions are embedded, matched against the transcript chunks, and
//! answered by a hosted model with the matching chunks as context.

pub mod context;
mod pipeline;

pub use context::{build_prompt, dedupe_sources, preview};
pub use pipeline::QueryPipeline;

use serde::{Deserialize, Serialize};

/// An episode cited by an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub episode: u32,
    pub guest: String,
    /// Similarity score of the best-ranked chunk from this episode.
    pub score: f32,
}

/// A generated answer with the episodes it drew from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagAnswer {
    pub response: String,
    pub sources: Vec<SourceAttribution>,
}

impl RagAnswer {
    /// Whether nothing was generated (blank question).
    pub fn is_empty(&self) -> bool {
        self.response.is_empty() && self.sources.is_empty()
    }
}
