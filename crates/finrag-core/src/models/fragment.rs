use serde::{Deserialize, Serialize};

/// Default number of characters shown for a fragment in the sources view
pub const DEFAULT_PREVIEW_CHARS: usize = 300;

/// A snippet of the filing returned by the retriever for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedFragment {
    /// Fragment text exactly as stored in the index
    pub text: String,

    /// 1-based position in the result list (1 = most similar)
    pub rank: usize,

    /// Similarity score reported by the index
    pub score: f32,
}

impl RetrievedFragment {
    pub fn new(text: impl Into<String>, rank: usize, score: f32) -> Self {
        Self { text: text.into(), rank, score }
    }

    /// Single-line preview for display, bounded to `max_chars` characters
    ///
    /// Only used for presentation; prompt construction always uses the full text.
    pub fn preview(&self, max_chars: usize) -> String {
        self.text
            .chars()
            .take(max_chars)
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect()
    }

    /// Whether the preview drops part of the text
    pub fn is_truncated(&self, max_chars: usize) -> bool {
        self.text.chars().count() > max_chars
    }
}
