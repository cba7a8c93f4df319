//! Passage store abstraction.
//!
//! Defines a trait for similarity search over pre-indexed page sections.
//! The store owns the passages and their stored embeddings; the pipeline
//! only reads ranked results.

pub mod supabase;

pub use supabase::SupabaseStore;

use crate::types::{MatchParams, PageSection};
use async_trait::async_trait;
use docsearch_core::AppResult;

/// Trait for passage store backends.
#[async_trait]
pub trait PassageStore: Send + Sync {
    /// Find sections similar to the query embedding.
    ///
    /// Returns sections ordered by descending similarity, as the store ranked
    /// them. An empty result is not an error.
    async fn match_sections(
        &self,
        embedding: &[f32],
        params: &MatchParams,
    ) -> AppResult<Vec<PageSection>>;
}
