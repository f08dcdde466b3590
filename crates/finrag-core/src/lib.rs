//! finrag Core - Domain models, error taxonomy, and configuration
//!
//! This crate contains the domain types shared by the retrieval pipeline and the
//! presentation layers: conversation turns, retrieved fragments, the prompt template,
//! and the layered pipeline configuration.

pub mod config;
pub mod error;
pub mod models;

pub use error::{FinragError, Result};
