use finrag_core::error::{FinragError, Result};
use finrag_core::models::RetrievedFragment;
use finrag_llm::ports::Embedder;
use finrag_store::ports::VectorIndex;
use std::sync::Arc;

/// Embeds a question and looks up its nearest fragments in the vector index
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Return at most `k` fragments, most similar first, ranked from 1
    ///
    /// Any failure of the embedding provider or the index surfaces as
    /// `RetrievalUnavailable`; no partial result is produced.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedFragment>> {
        let vector = self.embedder.embed_query(query).await.map_err(into_retrieval)?;
        let mut matches = self.index.query(&vector, k).await.map_err(into_retrieval)?;

        // NaN scores carry no ranking information
        let before = matches.len();
        matches.retain(|m| !m.score.is_nan());
        if matches.len() < before {
            tracing::warn!(index = %self.index.name(), dropped = before - matches.len(), "Dropped matches with NaN score");
        }
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(k);

        let mut fragments = Vec::with_capacity(matches.len());
        for m in matches {
            match m.text {
                Some(text) => {
                    let rank = fragments.len() + 1;
                    fragments.push(RetrievedFragment::new(text, rank, m.score));
                }
                None => {
                    tracing::warn!(id = %m.id, index = %self.index.name(), "Index match has no text, skipping");
                }
            }
        }

        tracing::debug!(
            index = %self.index.name(),
            embedder = %self.embedder.model_name(),
            k,
            returned = fragments.len(),
            "Retrieved fragments"
        );

        Ok(fragments)
    }
}

fn into_retrieval(err: FinragError) -> FinragError {
    match err {
        FinragError::RetrievalUnavailable { .. } => err,
        other => FinragError::retrieval(other.to_string()),
    }
}
