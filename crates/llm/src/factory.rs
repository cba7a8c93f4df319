//! LLM provider factory.
//!
//! Builds the shared OpenAI-compatible client from application
//! configuration. The client is constructed once per process and handed to
//! the pipeline as both the moderation and the completion collaborator.

use crate::providers::OpenAiClient;
use docsearch_core::config::OpenAiConfig;
use docsearch_core::{AppError, AppResult};
use std::sync::Arc;

/// Create the OpenAI-compatible client.
///
/// # Arguments
/// * `config` - OpenAI section of the application config
/// * `api_key` - API key resolved from the environment
///
/// # Errors
/// Returns error if:
/// - The API key is empty or not a valid header value
/// - The base URL is not an http(s) URL
/// - The HTTP client cannot be built
pub fn create_client(config: &OpenAiConfig, api_key: &str) -> AppResult<Arc<OpenAiClient>> {
    let base_url = config.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(AppError::Config(format!(
            "OpenAI base URL must be http(s): {}",
            base_url
        )));
    }

    let client = OpenAiClient::with_base_url(api_key, base_url)?
        .with_moderation_model(config.moderation_model.clone());

    tracing::debug!(
        "Created OpenAI client (base: {}, moderation model: {})",
        client.base_url(),
        config.moderation_model
    );

    Ok(Arc::new(client))
}
