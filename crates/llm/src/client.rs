//! LLM client abstraction and request types.
//!
//! This module defines the core abstractions for streaming chat completions.

use async_trait::async_trait;
use docsearch_core::AppResult;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role ("system", "user", "assistant")
    pub role: String,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Model identifier (e.g., "gpt-3.5-turbo-16k")
    pub model: String,

    /// Conversation to complete
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Enable streaming responses
    #[serde(default)]
    pub stream: bool,
}

impl LlmRequest {
    /// Create a request with a single user message.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: None,
            temperature: None,
            stream: false,
        }
    }

    /// Enable streaming for this request.
    pub fn with_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Stream of completion text fragments, in arrival order.
pub type LlmStream = Pin<Box<dyn Stream<Item = AppResult<String>> + Send>>;

/// Trait for chat completion providers.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// Submit a streaming completion.
    ///
    /// Resolves once the provider has accepted the request; a rejected
    /// request (non-success status) is an error here, before any fragment
    /// is produced. Dropping the returned stream releases the connection.
    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LlmRequest::new("Hello", "gpt-3.5-turbo")
            .with_streaming()
            .with_temperature(0.05)
            .with_max_tokens(4096);

        assert!(request.stream);
        assert_eq!(request.messages, vec![ChatMessage::user("Hello")]);
        assert_eq!(request.temperature, Some(0.05));
        assert_eq!(request.max_tokens, Some(4096));
    }

    #[test]
    fn test_request_serialization_shape() {
        let request = LlmRequest::new("Hi", "m").with_streaming();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "m");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hi");
        assert!(json.get("max_tokens").is_none());
    }
}
