//! Pinecone vector index adapter
//!
//! Queries go to the index's data-plane host. When only the index name is known the host
//! is looked up once through the control plane and reused for the rest of the process.

use async_trait::async_trait;
use finrag_core::error::{FinragError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use crate::ports::{IndexMatch, VectorIndex};

pub const DEFAULT_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
pub const DEFAULT_TEXT_KEY: &str = "text";
const API_VERSION: &str = "2024-07";

/// Hosted Pinecone index
pub struct PineconeIndex {
    index_name: String,
    api_key: String,
    control_plane_url: String,
    namespace: Option<String>,

    /// Metadata key holding the fragment text
    text_key: String,

    host: OnceCell<String>,
    client: reqwest::Client,
}

impl PineconeIndex {
    /// Create an adapter that resolves the data-plane host from the index name
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            index_name: index_name.into(),
            api_key: api_key.into(),
            control_plane_url: DEFAULT_CONTROL_PLANE_URL.to_string(),
            namespace: None,
            text_key: DEFAULT_TEXT_KEY.to_string(),
            host: OnceCell::new(),
            client,
        }
    }

    /// Use a known data-plane host instead of looking it up
    pub fn with_host(self, host: impl Into<String>) -> Self {
        Self { host: OnceCell::new_with(Some(normalize_host(&host.into()))), ..self }
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    pub fn with_control_plane_url(mut self, url: impl Into<String>) -> Self {
        self.control_plane_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_text_key(mut self, key: impl Into<String>) -> Self {
        self.text_key = key.into();
        self
    }

    async fn host(&self) -> Result<&str> {
        self.host.get_or_try_init(|| self.describe_host()).await.map(String::as_str)
    }

    async fn describe_host(&self) -> Result<String> {
        tracing::info!(index = %self.index_name, "Resolving Pinecone index host");

        let response = self
            .client
            .get(format!("{}/indexes/{}", self.control_plane_url, self.index_name))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| {
                FinragError::retrieval(format!("Failed to reach Pinecone control plane: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FinragError::retrieval(format!(
                "Failed to describe index '{}' ({}): {}",
                self.index_name, status, body
            )));
        }

        let description: IndexDescription = response.json().await.map_err(|e| {
            FinragError::retrieval(format!("Failed to parse index description: {}", e))
        })?;

        Ok(normalize_host(&description.host))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
        let host = self.host().await?;
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        };

        tracing::debug!(index = %self.index_name, top_k, "Querying Pinecone");

        let response = self
            .client
            .post(format!("{}/query", host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                FinragError::retrieval(format!("Failed to reach Pinecone index at {}: {}", host, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FinragError::retrieval(format!(
                "Pinecone query failed ({}): {}",
                status, body
            )));
        }

        let parsed: QueryResponse = response.json().await.map_err(|e| {
            FinragError::retrieval(format!("Failed to parse Pinecone response: {}", e))
        })?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| {
                let mut metadata = m.metadata.unwrap_or_default();
                let text = match metadata.remove(&self.text_key) {
                    Some(Value::String(text)) => Some(text),
                    Some(other) => {
                        metadata.insert(self.text_key.clone(), other);
                        None
                    }
                    None => None,
                };
                IndexMatch { id: m.id, score: m.score, text, metadata }
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.index_name
    }
}

/// Prefix bare hosts with https, keep explicit schemes
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("idx-abc.svc.pinecone.io"), "https://idx-abc.svc.pinecone.io");
        assert_eq!(normalize_host("http://127.0.0.1:5080/"), "http://127.0.0.1:5080");
    }

    #[tokio::test]
    async fn test_query_with_explicit_host() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("api-key", "pc-test"))
            .and(body_partial_json(json!({ "topK": 3, "includeMetadata": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [
                    { "id": "a", "score": 0.91, "metadata": { "text": "Net sales $383.3 billion", "page": 20 } },
                    { "id": "b", "score": 0.72, "metadata": { "source": "10-K" } }
                ],
                "namespace": ""
            })))
            .mount(&server)
            .await;

        let index = PineconeIndex::new(reqwest::Client::new(), "pc-test", "financial-10k")
            .with_host(server.uri());
        let matches = index.query(&[0.1, 0.2], 3).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].text.as_deref(), Some("Net sales $383.3 billion"));
        assert_eq!(matches[0].metadata["page"], 20);
        assert!(!matches[0].metadata.contains_key("text"));
        assert!(matches[1].text.is_none());
    }

    #[tokio::test]
    async fn test_host_is_resolved_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/financial-10k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "financial-10k",
                "host": server.uri(),
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matches": [] })))
            .expect(2)
            .mount(&server)
            .await;

        let index = PineconeIndex::new(reqwest::Client::new(), "pc-test", "financial-10k")
            .with_control_plane_url(server.uri());

        assert!(index.query(&[0.1], 3).await.unwrap().is_empty());
        assert!(index.query(&[0.1], 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_index_is_retrieval_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("index not found"))
            .mount(&server)
            .await;

        let index = PineconeIndex::new(reqwest::Client::new(), "pc-test", "missing")
            .with_control_plane_url(server.uri());
        let err = index.query(&[0.1], 3).await.unwrap_err();

        assert!(matches!(err, FinragError::RetrievalUnavailable { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn test_query_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let index = PineconeIndex::new(reqwest::Client::new(), "pc-test", "financial-10k")
            .with_host(server.uri())
            .with_namespace(Some("aapl".to_string()));
        let err = index.query(&[0.1], 3).await.unwrap_err();

        assert!(matches!(err, FinragError::RetrievalUnavailable { .. }));
    }
}
