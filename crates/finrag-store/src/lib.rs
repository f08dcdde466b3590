//! finrag Store - Vector index port and adapters
//!
//! This crate defines the vector index port and provides a Pinecone adapter for the
//! hosted index plus an in-memory index for development and testing.

pub mod memory;
pub mod pinecone;
pub mod ports;

pub use memory::{IndexEntry, MemoryVectorIndex};
pub use pinecone::PineconeIndex;
pub use ports::{IndexMatch, VectorIndex};
