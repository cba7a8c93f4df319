//! Pipeline factory.
//!
//! Wires the production collaborators from configuration and resolved
//! secrets. Everything here is built once per process.

use crate::context::BpeTokenCounter;
use crate::embeddings::{EmbeddingProvider, OpenAiEmbeddingProvider};
use crate::rag::{Collaborators, Pipeline, PipelineOptions};
use crate::store::SupabaseStore;
use docsearch_core::config::Secrets;
use docsearch_core::{AppConfig, AppResult};
use docsearch_llm::{create_client, LlmClient};
use std::sync::Arc;

/// Build the production pipeline.
///
/// # Errors
/// Returns error if a secret is unusable as a header value, an endpoint
/// URL is malformed, or the tokenizer vocabulary cannot be loaded.
pub fn build_pipeline(config: &AppConfig, secrets: &Secrets) -> AppResult<Pipeline> {
    let openai = create_client(&config.openai, &secrets.openai_api_key)?;

    let embedder = OpenAiEmbeddingProvider::new(
        &secrets.openai_api_key,
        config.openai.base_url.clone(),
        config.openai.embedding_model.clone(),
    )?;

    let store = SupabaseStore::new(
        &secrets.store_url,
        &secrets.store_service_key,
        &config.store.match_function,
    )?;

    let token_counter = BpeTokenCounter::new(config.context.encoding)?;

    tracing::info!(
        "Pipeline ready (completion: {}/{}, embedding: {}/{}, store: {}, tokenizer: {:?}, budget: {} tokens)",
        openai.provider_name(),
        config.openai.completion_model,
        embedder.provider_name(),
        embedder.model_name(),
        store.rpc_url(),
        token_counter.encoding(),
        config.context.token_budget
    );

    Pipeline::new(
        Collaborators {
            moderation: openai.clone(),
            embedder: Arc::new(embedder),
            store: Arc::new(store),
            completion: openai,
            token_counter: Arc::new(token_counter),
        },
        PipelineOptions::from_config(config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets() -> Secrets {
        Secrets {
            openai_api_key: "sk-test".to_string(),
            store_url: "https://xyz.supabase.co".to_string(),
            store_service_key: "service-key".to_string(),
        }
    }

    #[test]
    fn test_build_pipeline_with_defaults() {
        let config = AppConfig::default();
        let pipeline = build_pipeline(&config, &secrets()).unwrap();
        assert_eq!(pipeline.options().token_budget, 1500);
        assert_eq!(pipeline.options().completion_model, "gpt-3.5-turbo-16k");
    }

    #[test]
    fn test_build_pipeline_rejects_bad_store_url() {
        let config = AppConfig::default();
        let mut secrets = secrets();
        secrets.store_url = "not a url".to_string();
        assert!(build_pipeline(&config, &secrets).is_err());
    }
}
