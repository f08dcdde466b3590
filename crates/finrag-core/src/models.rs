pub mod conversation;
pub mod fragment;
pub mod pipeline;
pub mod prompt;
pub mod query;

pub use conversation::{Role, Transcript, Turn};
pub use fragment::{RetrievedFragment, DEFAULT_PREVIEW_CHARS};
pub use pipeline::PipelineConfig;
pub use prompt::{PromptTemplate, RenderedPrompt, DEFAULT_TEMPLATE};
pub use query::Query;
