//! finrag Retrieval - Retriever, answer pipeline, and chat sessions
//!
//! This crate implements the question-answering use case: retrieving fragments of the
//! filing for a question, grounding the language model on exactly those fragments, and
//! recording each exchange in a session transcript.

pub mod bootstrap;
pub mod pipeline;
pub mod retriever;
pub mod session;

pub use bootstrap::build_pipeline;
pub use pipeline::{Answer, AnswerPipeline};
pub use retriever::Retriever;
pub use session::{ChatSession, TurnOutcome};
