use chrono::{DateTime, Utc};
use finrag_core::config::DisplaySettings;
use finrag_core::models::{RetrievedFragment, Role, Turn, DEFAULT_PREVIEW_CHARS};
use serde::Serialize;
use uuid::Uuid;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok", service: "finrag-api" }
    }
}

/// Read-only settings shown in the sidebar
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    #[serde(flatten)]
    pub display: DisplaySettings,
    pub status: &'static str,
}

/// Session creation response
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TurnView {
    pub role: Role,
    pub content: String,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        Self { role: turn.role(), content: turn.content().to_string() }
    }
}

/// A fragment as shown in the sources panel
#[derive(Debug, Serialize)]
pub struct SourceView {
    pub rank: usize,
    pub score: f32,
    pub preview: String,
    pub truncated: bool,
}

impl SourceView {
    pub fn from_fragment(fragment: &RetrievedFragment) -> Self {
        Self {
            rank: fragment.rank,
            score: fragment.score,
            preview: fragment.preview(DEFAULT_PREVIEW_CHARS),
            truncated: fragment.is_truncated(DEFAULT_PREVIEW_CHARS),
        }
    }
}

/// Full session view
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub turns: Vec<TurnView>,

    /// Sources behind the most recent answer
    pub sources: Vec<SourceView>,
}

/// Result of one turn
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub answer: String,
    pub sources: Vec<SourceView>,
    pub turn_count: usize,
}

/// Delete operation response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteResponse {
    pub fn success(entity: &str, id: &str) -> Self {
        Self { success: true, message: format!("Successfully deleted {} {}", entity, id) }
    }
}
