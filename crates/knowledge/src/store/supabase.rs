//! Supabase (PostgREST) passage store.
//!
//! Similarity search runs inside Postgres as a remote procedure, called via
//! `POST {url}/rest/v1/rpc/{function}`.

use crate::store::PassageStore;
use crate::types::{MatchParams, PageSection};
use async_trait::async_trait;
use docsearch_core::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, error, instrument};

/// Arguments of the match procedure.
#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    embedding: &'a [f32],
    match_threshold: f32,
    match_count: u32,
    min_content_length: u32,
}

/// Passage store backed by a PostgREST remote procedure.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    /// HTTP client carrying the service key headers
    client: reqwest::Client,
    /// Full URL of the remote procedure
    rpc_url: String,
}

impl SupabaseStore {
    /// Create a store client.
    ///
    /// # Arguments
    /// * `url` - Project URL (e.g., "https://xyz.supabase.co")
    /// * `service_key` - Service role key, sent as `apikey` and bearer token
    /// * `function` - Name of the match procedure
    pub fn new(url: &str, service_key: &str, function: &str) -> AppResult<Self> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Passage store URL must be http(s): {}",
                url
            )));
        }
        if service_key.trim().is_empty() {
            return Err(AppError::Config("Missing passage store service key".to_string()));
        }

        let invalid_key = |_| AppError::Config("Invalid passage store service key".to_string());
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(service_key.trim()).map_err(invalid_key)?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", service_key.trim())).map_err(invalid_key)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build store HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rpc_url: format!("{}/rest/v1/rpc/{}", url, function),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl PassageStore for SupabaseStore {
    #[instrument(skip(self, embedding), fields(dims = embedding.len()))]
    async fn match_sections(
        &self,
        embedding: &[f32],
        params: &MatchParams,
    ) -> AppResult<Vec<PageSection>> {
        debug!("Calling match procedure at {}", self.rpc_url);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&MatchRequest {
                embedding,
                match_threshold: params.match_threshold,
                match_count: params.match_count,
                min_content_length: params.min_content_length,
            })
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Failed to reach passage store: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Match procedure failed ({}): {}", status, error_text);
            return Err(AppError::Knowledge(format!(
                "Failed to match page sections ({}): {}",
                status, error_text
            )));
        }

        let sections: Vec<PageSection> = response
            .json()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to parse page sections: {}", e)))?;

        debug!("Store returned {} page sections", sections.len());

        Ok(sections)
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
    async fn test_match_sections_request_and_order() {
        let seen: Arc<Mutex<Option<(Value, String)>>> = Arc::new(Mutex::new(None));
        let captured = Arc::clone(&seen);

        let router = Router::new().route(
            "/rest/v1/rpc/match_page_sections",
            post(move |headers: AxumHeaders, Json(body): Json<Value>| {
                let captured = Arc::clone(&captured);
                async move {
                    let apikey = headers
                        .get("apikey")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *captured.lock().unwrap() = Some((body, apikey));
                    Json(json!([
                        { "id": 1, "page_id": 1, "content": "first", "similarity": 0.95 },
                        { "id": 2, "page_id": 1, "content": "second", "similarity": 0.81 }
                    ]))
                }
            }),
        );
        let base = serve(router).await;

        let store = SupabaseStore::new(&base, "service-key", "match_page_sections").unwrap();
        let sections = store
            .match_sections(&[0.5, 0.25], &MatchParams::default())
            .await
            .unwrap();

        let contents: Vec<&str> = sections.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);

        let (body, apikey) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(apikey, "service-key");
        assert_eq!(body["embedding"], json!([0.5, 0.25]));
        assert_eq!(body["match_count"], 10);
        assert_eq!(body["min_content_length"], 50);
        assert!((body["match_threshold"].as_f64().unwrap() - 0.78).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_error() {
        let router = Router::new().route("/rest/v1/rpc/match", post(|| async { Json(json!([])) }));
        let base = serve(router).await;

        let store = SupabaseStore::new(&base, "k", "match").unwrap();
        let sections = store
            .match_sections(&[1.0], &MatchParams::default())
            .await
            .unwrap();
        assert!(sections.is_empty());
    }

    #[tokio::test]
    async fn test_store_error_status() {
        let router = Router::new().route(
            "/rest/v1/rpc/match",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "message": "function does not exist" })),
                )
            }),
        );
        let base = serve(router).await;

        let store = SupabaseStore::new(&base, "k", "match").unwrap();
        let err = store
            .match_sections(&[1.0], &MatchParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("function does not exist"));
    }

    #[test]
    fn test_rpc_url() {
        let store = SupabaseStore::new("https://xyz.supabase.co/", "k", "match_page_sections").unwrap();
        assert_eq!(
            store.rpc_url(),
            "https://xyz.supabase.co/rest/v1/rpc/match_page_sections"
        );
    }

    #[test]
    fn test_rejects_bad_url_and_key() {
        assert!(SupabaseStore::new("ftp://nope", "k", "f").is_err());
        assert!(SupabaseStore::new("https://ok", "", "f").is_err());
    }
}
