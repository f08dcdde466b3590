use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Browser chat
        .route("/", get(handlers::index_page))

        // Health
        .route("/health", get(handlers::health_check))

        // Sidebar settings
        .route("/api/v1/config", get(handlers::get_config))

        // Sessions
        .route("/api/v1/sessions", post(handlers::create_session))
        .route(
            "/api/v1/sessions/{session_id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/v1/sessions/{session_id}/turns", post(handlers::submit_turn))

        .with_state(state)
}
