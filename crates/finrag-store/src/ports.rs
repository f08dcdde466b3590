use async_trait::async_trait;
use finrag_core::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One nearest-neighbour hit returned by a vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    pub id: String,

    /// Similarity score (higher = more similar)
    pub score: f32,

    /// Source text of the fragment, if the index stored it
    pub text: Option<String>,

    /// Remaining metadata attached to the vector
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Port for nearest-neighbour search over pre-computed fragment vectors
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` matches for the query vector, most similar first
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>>;

    /// Human-readable identifier of the index
    fn name(&self) -> &str;
}
