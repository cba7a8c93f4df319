//! OpenAI-compatible embedding provider.
//!
//! Calls `POST {base}/embeddings` with `{ model, input }` and uses the first
//! vector of the response's `data` list.

use crate::embeddings::provider::{normalize_input, EmbeddingProvider};
use async_trait::async_trait;
use docsearch_core::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

/// Request payload for the embeddings API
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: String,
}

/// Response from the embeddings API
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Embedding provider backed by an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingProvider {
    /// HTTP client carrying the auth header
    client: reqwest::Client,
    /// Base URL, without trailing slash
    base_url: String,
    /// Model name (e.g., "text-embedding-ada-002")
    model: String,
}

impl OpenAiEmbeddingProvider {
    /// Create a provider.
    ///
    /// # Errors
    /// * `AppError::Config` - If the API key is empty or not a valid header value
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Config("Missing OpenAI API key".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
                .map_err(|_| AppError::Config("Invalid OpenAI API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to build embedding HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);
        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: normalize_input(text),
            })
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Failed to reach embedding service: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Embedding request failed ({}): {}", status, error_text);
            return Err(AppError::Knowledge(format!(
                "Embedding API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to parse embedding response: {}", e)))?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                AppError::Knowledge("Embedding response contained no vector".to_string())
            })?;

        debug!("Generated {} dimensional embedding", embedding.len());

        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_embed_sends_normalized_input() {
        let seen: Arc<Mutex<Option<(Value, String)>>> = Arc::new(Mutex::new(None));
        let captured = Arc::clone(&seen);

        let router = Router::new().route(
            "/embeddings",
            post(move |headers: AxumHeaders, Json(body): Json<Value>| {
                let captured = Arc::clone(&captured);
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *captured.lock().unwrap() = Some((body, auth));
                    Json(json!({
                        "data": [
                            { "embedding": [0.1, 0.2, 0.3] },
                            { "embedding": [9.0] }
                        ]
                    }))
                }
            }),
        );
        let base = serve(router).await;

        let provider =
            OpenAiEmbeddingProvider::new("sk-test", base, "text-embedding-ada-002").unwrap();
        let embedding = provider.embed("What is\na Shader Graph?").await.unwrap();

        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);

        let (body, auth) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["input"], "What is a Shader Graph?");
        assert_eq!(body["model"], "text-embedding-ada-002");
        assert_eq!(auth, "Bearer sk-test");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let router = Router::new().route(
            "/embeddings",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        );
        let base = serve(router).await;

        let provider = OpenAiEmbeddingProvider::new("sk-test", base, "m").unwrap();
        let err = provider.embed("hello").await.unwrap_err();

        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_empty_data_is_error() {
        let router = Router::new().route("/embeddings", post(|| async { Json(json!({ "data": [] })) }));
        let base = serve(router).await;

        let provider = OpenAiEmbeddingProvider::new("sk-test", base, "m").unwrap();
        assert!(provider.embed("hello").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_vector_is_error() {
        let router = Router::new().route(
            "/embeddings",
            post(|| async { Json(json!({ "data": [{ "embedding": [] }] })) }),
        );
        let base = serve(router).await;

        let provider = OpenAiEmbeddingProvider::new("sk-test", base, "m").unwrap();
        assert!(provider.embed("hello").await.is_err());
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(OpenAiEmbeddingProvider::new("  ", "http://localhost", "m").is_err());
    }
}
