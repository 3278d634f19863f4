//! Word-count splitter with overlapping windows.

use super::TextSplit;
use crate::config::SplitterSettings;
use crate::error::{DataCommitError, Result};

/// Splits text into windows of `split_length` words that overlap by
/// `split_overlap` words.
///
/// A trailing window shorter than `split_threshold` words is merged into the
/// split before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSplitter {
    split_length: usize,
    split_overlap: usize,
    split_threshold: usize,
}

impl WordSplitter {
    pub fn new(split_length: usize, split_overlap: usize, split_threshold: usize) -> Result<Self> {
        if split_length == 0 {
            return Err(DataCommitError::Config(
                "split_length must be greater than 0".to_string(),
            ));
        }
        if split_overlap >= split_length {
            return Err(DataCommitError::Config(format!(
                "split_overlap ({}) must be smaller than split_length ({})",
                split_overlap, split_length
            )));
        }

        Ok(Self {
            split_length,
            split_overlap,
            split_threshold,
        })
    }

    pub fn from_settings(settings: &SplitterSettings) -> Result<Self> {
        Self::new(
            settings.split_length,
            settings.split_overlap,
            settings.split_threshold,
        )
    }

    fn step(&self) -> usize {
        self.split_length - self.split_overlap
    }

    /// Split `text` into overlapping word windows.
    pub fn split(&self, text: &str) -> Vec<TextSplit> {
        let units = units(text);
        let mut splits: Vec<TextSplit> = Vec::new();
        let mut cur_start_idx = 0usize;

        for (start, end) in self.windows(units.len()) {
            let window = &units[start..end];
            let content: String = window.concat();

            if window.len() < self.split_threshold && !splits.is_empty() {
                if let Some(last) = splits.last_mut() {
                    last.content.push_str(&content);
                }
            } else if !content.is_empty() {
                splits.push(TextSplit {
                    content,
                    split_id: splits.len() as u32,
                    split_idx_start: cur_start_idx,
                });
            }

            cur_start_idx += window
                .iter()
                .take(self.step())
                .map(|u| u.chars().count())
                .sum::<usize>();
        }

        splits
    }

    /// Unit ranges `[start, end)` of every window over `len` units.
    fn windows(&self, len: usize) -> Vec<(usize, usize)> {
        let n = self.split_length;
        let step = self.step();

        if len <= n {
            return vec![(0, len)];
        }

        let mut windows = Vec::new();
        let mut start = 0;
        while start + n <= len {
            windows.push((start, start + n));
            start += step;
        }

        // `start` now sits one step past the last full window
        let last_end = start - step + n;
        if last_end < len {
            windows.push((start, len));
        }

        windows
    }
}

impl Default for WordSplitter {
    fn default() -> Self {
        Self {
            split_length: 800,
            split_overlap: 200,
            split_threshold: 10,
        }
    }
}

/// Split on single spaces, keeping the separator on every unit but the last.
fn units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut begin = 0;

    for (idx, _) in text.match_indices(' ') {
        units.push(&text[begin..idx + 1]);
        begin = idx + 1;
    }
    units.push(&text[begin..]);

    units
}
