use async_trait::async_trait;
use finrag_core::error::{FinragError, Result};
use serde::{Deserialize, Serialize};

use crate::ports::{Embedder, GenerationOptions, Generator};

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint
pub struct OpenAiEmbedder {
    /// Base URL for the API (e.g., "https://api.openai.com/v1")
    base_url: String,

    api_key: String,

    /// Model name to use for embeddings
    model: String,

    /// HTTP client, shared with the other adapters
    client: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest { model: &self.model, input: texts };

        tracing::debug!(model = %self.model, inputs = texts.len(), "Requesting embeddings");

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                FinragError::retrieval(format!(
                    "Failed to reach embedding provider at {}: {}",
                    self.base_url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FinragError::retrieval(format!(
                "Embedding provider error ({}): {}",
                status,
                api_error_message(&body)
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            FinragError::retrieval(format!("Failed to parse embedding response: {}", e))
        })?;

        if parsed.data.len() != texts.len() {
            return Err(FinragError::retrieval(format!(
                "Embedding provider returned {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Generator backed by an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiGenerator {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            api_key: api_key.into(),
            client,
        }
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        // The whole rendered prompt goes out as a single user message
        let request = ChatRequest {
            model: &options.model,
            temperature: options.temperature,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };

        tracing::debug!(
            model = %options.model,
            temperature = options.temperature,
            prompt_chars = prompt.len(),
            "Requesting chat completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                FinragError::generation(format!(
                    "Failed to reach language model at {}: {}",
                    self.base_url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FinragError::generation(format!(
                "Language model error ({}): {}",
                status,
                api_error_message(&body)
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            FinragError::generation(format!("Failed to parse chat completion: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| FinragError::generation("Chat completion contained no message content"))
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Extract `error.message` from an OpenAI error body, falling back to the raw text
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
