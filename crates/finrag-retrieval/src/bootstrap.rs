//! Wiring of the hosted collaborators into an answer pipeline
//!
//! Everything is built once at startup and shared by every turn of every session.

use finrag_core::config::{Credentials, LayeredConfig};
use finrag_core::error::{FinragError, Result};
use finrag_llm::openai::{OpenAiEmbedder, OpenAiGenerator};
use finrag_store::pinecone::PineconeIndex;
use std::sync::Arc;
use std::time::Duration;

use crate::pipeline::AnswerPipeline;

/// Build the shared HTTP client
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FinragError::config_invalid("http_client", e.to_string()))
}

/// Build the answer pipeline against OpenAI and Pinecone
pub fn build_pipeline(config: &LayeredConfig, credentials: &Credentials) -> Result<AnswerPipeline> {
    let client = http_client(Duration::from_secs(config.http_timeout_secs.value))?;
    let pipeline_config = config.pipeline_config();

    let embedder = OpenAiEmbedder::new(
        client.clone(),
        &config.openai_base_url.value,
        &credentials.openai_api_key,
        &pipeline_config.embedding_model,
    );

    let generator =
        OpenAiGenerator::new(client.clone(), &config.openai_base_url.value, &credentials.openai_api_key);

    let mut index = PineconeIndex::new(client, &credentials.pinecone_api_key, &config.index_name.value)
        .with_namespace(config.namespace.value.clone());
    if let Some(host) = &config.index_host.value {
        index = index.with_host(host);
    }

    tracing::info!(
        chat_model = %pipeline_config.chat_model,
        embedding_model = %pipeline_config.embedding_model,
        index = %config.index_name.value,
        top_k = pipeline_config.top_k,
        "Answer pipeline ready"
    );

    Ok(AnswerPipeline::new(Arc::new(embedder), Arc::new(index), Arc::new(generator), pipeline_config))
}
