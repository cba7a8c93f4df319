//! Request and pipeline types.

use crate::types::MatchParams;
use docsearch_core::{AppConfig, PipelineError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Body of a vector-search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    /// The user's question
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Parse a raw request body and return the sanitized (trimmed) question.
///
/// Missing, unparsable or empty input is a caller error.
pub fn parse_request(body: &[u8]) -> Result<String, PipelineError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PipelineError::caller("Missing request data"));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PipelineError::caller(format!("Invalid request data: {}", e)))?;
    if value.is_null() {
        return Err(PipelineError::caller("Missing request data"));
    }

    let request: AskRequest = serde_json::from_value(value)
        .map_err(|e| PipelineError::caller(format!("Invalid request data: {}", e)))?;

    sanitize(request.prompt.as_deref().unwrap_or_default())
}

/// Trim a question, rejecting one that is empty afterwards.
pub(crate) fn sanitize(question: &str) -> Result<String, PipelineError> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::caller("Missing query in request data"));
    }
    Ok(trimmed.to_string())
}

/// States of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    Moderating,
    Embedding,
    Retrieving,
    Assembling,
    Completing,
    Streaming,
    Done,
    Errored,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Moderating => "moderating",
            Self::Embedding => "embedding",
            Self::Retrieving => "retrieving",
            Self::Assembling => "assembling",
            Self::Completing => "completing",
            Self::Streaming => "streaming",
            Self::Done => "done",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Chat model used for the answer
    pub completion_model: String,

    /// Similarity search parameters
    pub match_params: MatchParams,

    /// Context size limit, in tokens
    pub token_budget: usize,

    /// Completion sampling temperature
    pub temperature: f32,

    /// Completion generation cap
    pub max_tokens: u32,

    /// Deadline for each collaborator call before streaming starts
    pub timeout: Option<Duration>,
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            completion_model: config.openai.completion_model.clone(),
            match_params: MatchParams::from(&config.retrieval),
            token_budget: config.context.token_budget,
            temperature: config.completion.temperature,
            max_tokens: config.completion.max_tokens,
            timeout: config.http.timeout(),
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
