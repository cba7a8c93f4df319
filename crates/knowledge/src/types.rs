//! Core types for passage retrieval.

use docsearch_core::config::RetrievalConfig;
use serde::{Deserialize, Serialize};

/// A pre-indexed documentation passage returned by similarity search.
///
/// Owned by the passage store; the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSection {
    /// Row identifier in the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Page the section belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<i64>,

    /// Passage text
    pub content: String,

    /// Similarity to the query vector, computed at query time
    #[serde(default)]
    pub similarity: f32,
}

impl PageSection {
    pub fn new(content: impl Into<String>, similarity: f32) -> Self {
        Self {
            id: None,
            page_id: None,
            content: content.into(),
            similarity,
        }
    }
}

/// Parameters for one similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchParams {
    /// Passages below this similarity are excluded
    pub match_threshold: f32,

    /// Result cap
    pub match_count: u32,

    /// Minimum passage length in characters
    pub min_content_length: u32,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

impl From<&RetrievalConfig> for MatchParams {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            match_threshold: config.match_threshold,
            match_count: config.match_count,
            min_content_length: config.min_content_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_match_params() {
        let params = MatchParams::default();
        assert_eq!(params.match_threshold, 0.78);
        assert_eq!(params.match_count, 10);
        assert_eq!(params.min_content_length, 50);
    }

    #[test]
    fn test_section_ignores_unknown_columns() {
        let section: PageSection = serde_json::from_value(serde_json::json!({
            "id": 4,
            "page_id": 2,
            "slug": "shader-graph",
            "heading": "Overview",
            "content": "Shader Graph lets you build shaders visually.",
            "similarity": 0.91
        }))
        .unwrap();

        assert_eq!(section.id, Some(4));
        assert_eq!(section.page_id, Some(2));
        assert_eq!(section.similarity, 0.91);
    }
}
