//! Word-window chunking for breaking transcripts into retrievable segments.
//!
//! Transcripts are cut into overlapping windows of whitespace-delimited
//! words before they are embedded.

mod word;

pub use word::WordSplitter;

use serde::{Deserialize, Serialize};

/// One piece of a split document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSplit {
    /// Text of the split, including the trailing spaces of its words.
    pub content: String,
    /// Position of this split among the splits of the document.
    pub split_id: u32,
    /// Character offset where the split starts in the document.
    pub split_idx_start: usize,
}
