//! Content moderation abstraction.

use async_trait::async_trait;
use docsearch_core::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of moderating one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    /// Whether any category tripped
    pub flagged: bool,

    /// Category name to verdict, kept exactly as the service returned it
    #[serde(default)]
    pub categories: Map<String, Value>,
}

impl ModerationVerdict {
    /// Structured detail returned to a caller whose input was flagged.
    pub fn to_caller_data(&self) -> Value {
        serde_json::json!({
            "flagged": self.flagged,
            "categories": self.categories,
        })
    }
}

/// Trait for moderation services.
#[async_trait]
pub trait ModerationClient: Send + Sync {
    /// Moderate a single input and return the first (only relevant) verdict.
    async fn moderate(&self, input: &str) -> AppResult<ModerationVerdict>;
}
