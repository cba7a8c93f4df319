//! Embedding provider trait.

use docsearch_core::AppResult;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get provider name (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Generate the embedding for a single text.
    ///
    /// Implementations apply [`normalize_input`] before sending the text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Replace line breaks with spaces; embedding models score them poorly.
pub fn normalize_input(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
