use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::{
    DeleteResponse, SessionCreatedResponse, SessionResponse, TurnRequest, TurnResponse,
};
use crate::error::ApiError;
use crate::services::ChatService;
use crate::state::AppState;

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|e| ApiError::bad_request("Invalid session ID").with_details(e.to_string()))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionCreatedResponse>) {
    let (session_id, created_at) = state.sessions.create();
    (StatusCode::CREATED, Json(SessionCreatedResponse { session_id, created_at }))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let id = parse_session_id(&session_id)?;
    ChatService::session_view(&state, id).await.map(Json)
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_session_id(&session_id)?;
    state.sessions.remove(id)?;
    Ok(Json(DeleteResponse::success("session", &session_id)))
}

pub async fn submit_turn(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let id = parse_session_id(&session_id)?;
    tracing::info!(session_id = %id, question_len = request.question.len(), "Submitting turn");

    ChatService::submit_turn(&state, id, &request.question).await.map(Json)
}
