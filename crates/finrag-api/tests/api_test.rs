//! HTTP surface tests against an in-process pipeline

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use finrag_api::{create_router, AppState};
use finrag_core::config::LayeredConfig;
use finrag_core::error::{FinragError, Result};
use finrag_core::models::PipelineConfig;
use finrag_llm::ports::{Embedder, GenerationOptions, Generator};
use finrag_retrieval::AnswerPipeline;
use finrag_store::memory::{IndexEntry, MemoryVectorIndex};
use finrag_store::ports::{IndexMatch, VectorIndex};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct LengthEmbedder;

#[async_trait]
impl Embedder for LengthEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                vec![lower.matches("revenue").count() as f32, lower.matches("risk").count() as f32, 0.1]
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String> {
        Ok("Revenue was $383.3 billion.".to_string())
    }
}

struct DownIndex;

#[async_trait]
impl VectorIndex for DownIndex {
    async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<IndexMatch>> {
        Err(FinragError::retrieval("index unreachable"))
    }

    fn name(&self) -> &str {
        "down"
    }
}

fn app_with(index: Arc<dyn VectorIndex>, session_idle_timeout: Duration) -> Router {
    let pipeline =
        AnswerPipeline::new(Arc::new(LengthEmbedder), index, Arc::new(EchoGenerator), PipelineConfig::default());
    let display = LayeredConfig::with_defaults().display_settings();
    create_router(Arc::new(AppState::new(Arc::new(pipeline), display, session_idle_timeout)))
}

fn app_with_index(index: Arc<dyn VectorIndex>) -> Router {
    app_with(index, Duration::from_secs(1800))
}

fn app() -> Router {
    let long_text = format!("Total net sales revenue was $383.3 billion. {}", "Detail. ".repeat(60));
    let index = MemoryVectorIndex::from_entries(
        "financial-10k",
        vec![
            IndexEntry::new("rev", vec![1.0, 0.0, 0.1], long_text),
            IndexEntry::new("risk", vec![0.0, 1.0, 0.1], "Risk factors include supply chain disruption."),
        ],
    );
    app_with_index(Arc::new(index))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "service": "finrag-api" }));
}

#[tokio::test]
async fn test_config_exposes_display_settings() {
    let (status, body) = send(&app(), "GET", "/api/v1/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document_label"], "Apple Inc. (AAPL) 10-K Filing (2023)");
    assert_eq!(body["strict_citation"], true);
    assert_eq!(body["status"], "System Online");
    assert!(body["fiscal_years"].as_array().unwrap().len() >= 1);
}

#[tokio::test]
async fn test_index_page_is_served() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Verified Sources"));
    assert!(html.contains("Analyzing documents..."));
}

#[tokio::test]
async fn test_turn_returns_answer_and_previews() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/turns", id),
        Some(json!({ "question": "What was revenue?" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Revenue was $383.3 billion.");
    assert_eq!(body["turn_count"], 2);
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources[0]["rank"], 1);
    assert_eq!(sources[0]["truncated"], true);
    assert_eq!(sources[0]["preview"].as_str().unwrap().chars().count(), 300);

    let (status, session) = send(&app, "GET", &format!("/api/v1/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let turns = session["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[0]["content"], "What was revenue?");
    assert_eq!(turns[1]["role"], "assistant");
    assert_eq!(session["sources"].as_array().unwrap().len(), sources.len());
}

#[tokio::test]
async fn test_blank_question_is_bad_request() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/turns", id),
        Some(json!({ "question": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid question");

    let (_, session) = send(&app, "GET", &format!("/api/v1/sessions/{}", id), None).await;
    assert!(session["turns"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_index_is_service_unavailable() {
    let app = app_with_index(Arc::new(DownIndex));
    let id = new_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/turns", id),
        Some(json!({ "question": "What are the risks?" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["details"].as_str().unwrap().contains("index unreachable"));

    let (_, session) = send(&app, "GET", &format!("/api/v1/sessions/{}", id), None).await;
    let turns = session["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["role"], "user");
}

#[tokio::test]
async fn test_unknown_and_deleted_sessions() {
    let app = app();
    let missing = "00000000-0000-4000-8000-000000000000";

    let (status, _) = send(&app, "GET", &format!("/api/v1/sessions/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/v1/sessions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = new_session(&app).await;
    let (status, body) = send(&app, "DELETE", &format!("/api/v1/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/turns", id),
        Some(json!({ "question": "What was revenue?" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_idle_session_expires() {
    let app = app_with(Arc::new(MemoryVectorIndex::new("empty")), Duration::from_millis(50));
    let id = new_session(&app).await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/turns", id),
        Some(json!({ "question": "What was revenue?" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");
}

#[tokio::test]
async fn test_index_page_ends_session_on_pagehide() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(html.contains("\"pagehide\""));
    assert!(html.contains("keepalive: true"));
    assert!(html.contains("<button type=\"submit\" id=\"send\" disabled>"));
}
