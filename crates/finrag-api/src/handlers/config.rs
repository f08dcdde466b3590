use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::ConfigResponse;
use crate::state::AppState;

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse { display: state.display.clone(), status: "System Online" })
}
