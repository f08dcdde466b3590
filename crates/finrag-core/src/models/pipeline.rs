use serde::Serialize;

use super::prompt::PromptTemplate;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_TOP_K: usize = 3;

/// Settings that shape every pipeline invocation
///
/// Built once at startup from the layered configuration and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub chat_model: String,
    pub temperature: f32,
    pub top_k: usize,
    pub embedding_model: String,
    pub prompt_template: PromptTemplate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.0,
            top_k: DEFAULT_TOP_K,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            prompt_template: PromptTemplate::default(),
        }
    }
}
