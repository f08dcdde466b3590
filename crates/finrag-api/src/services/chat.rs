use uuid::Uuid;

use crate::dto::{SessionResponse, SourceView, TurnResponse, TurnView};
use crate::error::ApiError;
use crate::state::AppState;

/// Service for running and reading conversation turns
pub struct ChatService;

impl ChatService {
    /// Run one turn on a session
    ///
    /// Holds the session lock for the whole turn, so a second question on the same
    /// session waits until the first has been answered or has failed.
    pub async fn submit_turn(
        state: &AppState,
        session_id: Uuid,
        question: &str,
    ) -> Result<TurnResponse, ApiError> {
        let handle = state.sessions.get(session_id)?;
        let mut entry = handle.lock().await;

        let outcome = entry.session.submit(&state.pipeline, question).await.map_err(|e| {
            tracing::error!(session_id = %session_id, error = %e, "Turn failed");
            ApiError::from(e)
        })?;

        Ok(TurnResponse {
            answer: outcome.answer,
            sources: outcome.sources.iter().map(SourceView::from_fragment).collect(),
            turn_count: entry.session.transcript().len(),
        })
    }

    /// Snapshot of a session's transcript and latest sources
    pub async fn session_view(state: &AppState, session_id: Uuid) -> Result<SessionResponse, ApiError> {
        let handle = state.sessions.get(session_id)?;
        let entry = handle.lock().await;

        Ok(SessionResponse {
            session_id: entry.id,
            created_at: entry.created_at,
            turns: entry.session.transcript().all().iter().map(TurnView::from).collect(),
            sources: entry.session.last_sources().iter().map(SourceView::from_fragment).collect(),
        })
    }
}
