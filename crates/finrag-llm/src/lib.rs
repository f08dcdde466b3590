//! finrag LLM - Embedding and generation ports
//!
//! This crate defines the ports for embedding and text generation,
//! along with adapters for OpenAI-compatible HTTP APIs.

pub mod openai;
pub mod ports;

// Re-export main types
pub use openai::{OpenAiEmbedder, OpenAiGenerator};
pub use ports::{Embedder, GenerationOptions, Generator};
