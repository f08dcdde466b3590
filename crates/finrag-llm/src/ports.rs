//! LLM port definitions

use async_trait::async_trait;
use finrag_core::error::{FinragError, Result};

/// Port for embedding text into vector representations
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for a batch of texts
    ///
    /// # Returns
    /// Vector of embedding vectors, one per input text, in input order
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Get the name/identifier of the embedding model
    fn model_name(&self) -> &str;

    /// Embed a single query string
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text]).await?.into_iter().next().ok_or_else(|| {
            FinragError::retrieval(format!(
                "embedding model '{}' returned no vector",
                self.model_name()
            ))
        })
    }
}

/// Per-call generation settings
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: f32,
}

/// Port for text generation
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a fully rendered prompt
    ///
    /// # Returns
    /// The raw text produced by the model
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;
}
