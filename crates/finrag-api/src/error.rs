use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finrag_core::error::FinragError;
use serde::Serialize;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<FinragError> for ApiError {
    fn from(err: FinragError) -> Self {
        match &err {
            FinragError::InvalidQuery { .. } => {
                Self::bad_request("Invalid question").with_details(err.to_string())
            }
            FinragError::SessionNotFound { .. } => {
                Self::not_found("Session not found").with_details(err.to_string())
            }
            FinragError::RetrievalUnavailable { .. } => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "Retrieval unavailable")
                    .with_details(err.to_string())
            }
            FinragError::GenerationFailed { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, "Generation failed").with_details(err.to_string())
            }
            _ => Self::internal("Internal error").with_details(err.to_string()),
        }
    }
}
