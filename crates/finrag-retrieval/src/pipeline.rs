use finrag_core::error::{FinragError, Result};
use finrag_core::models::{PipelineConfig, Query, RenderedPrompt, RetrievedFragment};
use finrag_llm::ports::{Embedder, GenerationOptions, Generator};
use finrag_store::ports::VectorIndex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::retriever::Retriever;

/// Separator placed between fragment texts in the context block
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Result of one pipeline invocation
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Parsed model answer
    pub text: String,

    /// Fragments retrieved for the question, in the order they appear in the prompt
    pub fragments: Vec<RetrievedFragment>,

    /// Prompt sent to the language model
    pub prompt: RenderedPrompt,
}

/// Retrieval-augmented answering for one question at a time
///
/// Holds no per-question state; the same instance serves every turn of every session.
pub struct AnswerPipeline {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    config: PipelineConfig,
}

impl AnswerPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn Generator>,
        config: PipelineConfig,
    ) -> Self {
        Self { retriever: Retriever::new(embedder, index), generator, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Answer a question from the fragments retrieved for it
    pub async fn answer(&self, query: &Query) -> Result<Answer> {
        let started = Instant::now();

        let fragments = self.retriever.retrieve(query.as_str(), self.config.top_k).await?;
        let context = build_context(&fragments);
        let prompt = self.config.prompt_template.render(&context, query.as_str());

        let options = GenerationOptions {
            model: self.config.chat_model.clone(),
            temperature: self.config.temperature,
        };
        let raw = self.generator.generate(&prompt.text, &options).await.map_err(|e| match e {
            FinragError::GenerationFailed { .. } => e,
            other => FinragError::generation(other.to_string()),
        })?;
        let text = parse_answer(&raw)?;

        tracing::info!(
            query_chars = query.as_str().len(),
            fragments = fragments.len(),
            answer_chars = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered question"
        );

        Ok(Answer { text, fragments, prompt })
    }
}

/// Join fragment texts in rank order
pub fn build_context(fragments: &[RetrievedFragment]) -> String {
    fragments.iter().map(|f| f.text.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

/// Turn raw model output into the displayed answer
fn parse_answer(raw: &str) -> Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(FinragError::generation("Language model returned an empty answer"));
    }
    Ok(text.to_string())
}
