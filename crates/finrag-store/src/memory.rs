//! In-memory vector index for development and testing.
//!
//! Uses `RwLock::unwrap()` intentionally. Lock poisoning only occurs when another
//! thread panicked while holding the lock, which is an unrecoverable state.

use async_trait::async_trait;
use finrag_core::error::Result;
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};

use crate::ports::{IndexMatch, VectorIndex};

/// A stored (vector, text, metadata) triple
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: Map<String, Value>,
}

impl IndexEntry {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, text: impl Into<String>) -> Self {
        Self { id: id.into(), vector, text: text.into(), metadata: Map::new() }
    }
}

/// Brute-force cosine similarity index
#[derive(Debug, Clone, Default)]
pub struct MemoryVectorIndex {
    name: String,
    entries: Arc<RwLock<Vec<IndexEntry>>>,
}

impl MemoryVectorIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: Arc::default() }
    }

    pub fn from_entries(name: impl Into<String>, entries: Vec<IndexEntry>) -> Self {
        Self { name: name.into(), entries: Arc::new(RwLock::new(entries)) }
    }

    pub fn insert(&self, entry: IndexEntry) {
        self.entries.write().unwrap().push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calculate cosine similarity between two vectors
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
        let entries = self.entries.read().unwrap();

        let mut matches: Vec<IndexMatch> = entries
            .iter()
            .map(|entry| IndexMatch {
                id: entry.id.clone(),
                score: Self::cosine_similarity(vector, &entry.vector),
                text: Some(entry.text.clone()),
                metadata: entry.metadata.clone(),
            })
            .collect();

        // Sort by score descending
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);

        Ok(matches)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
