use finrag_core::config::DisplaySettings;
use finrag_retrieval::AnswerPipeline;
use std::sync::Arc;
use std::time::Duration;

use crate::services::SessionStore;

pub struct AppState {
    pub pipeline: Arc<AnswerPipeline>,
    pub sessions: SessionStore,
    pub display: DisplaySettings,
}

impl AppState {
    pub fn new(
        pipeline: Arc<AnswerPipeline>,
        display: DisplaySettings,
        session_idle_timeout: Duration,
    ) -> Self {
        Self { pipeline, sessions: SessionStore::new(session_idle_timeout), display }
    }
}
