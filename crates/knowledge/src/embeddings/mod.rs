//! Query embedding.
//!
//! Converts the sanitized question into a vector through an external
//! embedding service.

pub mod provider;
pub mod providers;

pub use provider::{normalize_input, EmbeddingProvider};
pub use providers::OpenAiEmbeddingProvider;
