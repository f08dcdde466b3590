//! Error types for finrag

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinragError {
    // Input errors
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    // Pipeline errors
    #[error("Retrieval unavailable: {reason}")]
    RetrievalUnavailable { reason: String },

    #[error("Generation failed: {reason}")]
    GenerationFailed { reason: String },

    // Session errors
    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FinragError {
    pub fn retrieval(reason: impl Into<String>) -> Self {
        Self::RetrievalUnavailable { reason: reason.into() }
    }

    pub fn generation(reason: impl Into<String>) -> Self {
        Self::GenerationFailed { reason: reason.into() }
    }

    pub fn config_invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid { key: key.into(), reason: reason.into() }
    }

    /// Startup errors that must keep the process out of its serving loop
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigMissing { .. } | Self::ConfigInvalid { .. })
    }
}

impl From<serde_json::Error> for FinragError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FinragError>;
