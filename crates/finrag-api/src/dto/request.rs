use serde::Deserialize;

/// Turn request body
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub question: String,
}
