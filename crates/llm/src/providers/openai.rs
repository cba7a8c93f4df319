//! OpenAI-compatible provider: moderation and streamed chat completions.
//!
//! API reference: https://platform.openai.com/docs/api-reference

use crate::client::{LlmClient, LlmRequest, LlmStream};
use crate::moderation::{ModerationClient, ModerationVerdict};
use crate::providers::sse::{SseDecoder, SseEvent};
use async_trait::async_trait;
use docsearch_core::{AppError, AppResult};
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Moderation request body.
#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
    model: &'a str,
}

/// Moderation response body.
#[derive(Debug, Deserialize)]
struct ModerationResponse {
    #[serde(default)]
    results: Vec<ModerationVerdict>,
}

/// One streamed completion chunk.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,

    /// Set when the provider fails after the stream has started
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible client.
///
/// Holds one pooled HTTP client; cheap to share behind an `Arc`.
pub struct OpenAiClient {
    /// Base URL, without trailing slash
    base_url: String,

    /// Model used for moderation calls
    moderation_model: String,

    /// HTTP client carrying the auth header
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client against the public OpenAI endpoint.
    pub fn new(api_key: &str) -> AppResult<Self> {
        Self::with_base_url(api_key, DEFAULT_OPENAI_URL)
    }

    /// Create a client against a custom OpenAI-compatible base URL.
    pub fn with_base_url(api_key: &str, base_url: impl Into<String>) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Config("Missing OpenAI API key".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| AppError::Config("Invalid OpenAI API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build OpenAI HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            moderation_model: "text-moderation-latest".to_string(),
            client,
        })
    }

    /// Set the moderation model identifier.
    pub fn with_moderation_model(mut self, model: impl Into<String>) -> Self {
        self.moderation_model = model.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ModerationClient for OpenAiClient {
    async fn moderate(&self, input: &str) -> AppResult<ModerationVerdict> {
        let url = format!("{}/moderations", self.base_url);
        tracing::debug!("Sending moderation request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&ModerationRequest {
                input,
                model: &self.moderation_model,
            })
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Failed to reach moderation service: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Moderation API error ({}): {}",
                status, error_text
            )));
        }

        let body: ModerationResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse moderation response: {}", e)))?;

        body.results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("Moderation response contained no results".to_string()))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::info!("Starting streaming completion (model: {})", request.model);

        let mut body = request.clone();
        body.stream = true;

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Failed to send completion request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Completion request rejected ({}): {}", status, error_text);
            return Err(AppError::Llm(format!(
                "Completion API error ({}): {}",
                status, error_text
            )));
        }

        Ok(decode_chat_stream(Box::pin(response.bytes_stream())))
    }
}

/// Pull state for [`decode_chat_stream`].
struct ChatStreamState<S> {
    body: S,
    decoder: SseDecoder,
    pending: VecDeque<AppResult<String>>,
    finished: bool,
}

impl<S> ChatStreamState<S> {
    /// Queue the fragment carried by one SSE event.
    fn accept(&mut self, event: SseEvent) {
        match event {
            SseEvent::Done => self.finished = true,
            SseEvent::Data(payload) => match serde_json::from_str::<ChatChunk>(&payload) {
                Ok(ChatChunk {
                    choices,
                    error: Some(error),
                }) if choices.is_empty() => {
                    tracing::error!("Completion stream reported an error: {}", error);
                    self.pending.push_back(Err(AppError::Llm(format!(
                        "Completion stream error: {}",
                        error
                    ))));
                    self.finished = true;
                }
                Ok(chunk) => {
                    let content = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content);
                    if let Some(content) = content.filter(|c| !c.is_empty()) {
                        self.pending.push_back(Ok(content));
                    }
                }
                Err(e) => {
                    self.pending.push_back(Err(AppError::Llm(format!(
                        "Failed to parse completion chunk: {}",
                        e
                    ))));
                    self.finished = true;
                }
            },
        }
    }
}

/// Turn a raw SSE byte stream into completion text fragments.
///
/// Bytes are only pulled from `body` when the consumer asks for the next
/// fragment, and nothing is read past the `[DONE]` sentinel.
pub(crate) fn decode_chat_stream<S, B, E>(body: S) -> LlmStream
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = ChatStreamState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    for event in state.decoder.push(bytes.as_ref()) {
                        if state.finished {
                            break;
                        }
                        state.accept(event);
                    }
                }
                Some(Err(e)) => {
                    state
                        .pending
                        .push_back(Err(AppError::Http(format!("Completion stream error: {}", e))));
                    state.finished = true;
                }
                None => {
                    if let Some(event) = state.decoder.finish() {
                        state.accept(event);
                    }
                    state.finished = true;
                }
            }
        }
    }))
}
