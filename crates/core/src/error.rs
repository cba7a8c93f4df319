//! Error types for docsearch.
//!
//! Two layers live here:
//! - [`AppError`]: the plumbing error every crate returns from I/O, HTTP,
//!   parsing and configuration code.
//! - [`PipelineError`]: the two-kind taxonomy the request pipeline reports to
//!   its caller. Anything that is not explicitly a caller mistake becomes a
//!   [`PipelineError::System`].

use serde_json::Value;
use thiserror::Error;

/// Unified plumbing error type.
///
/// All library functions return `Result<T, AppError>`.
/// We never panic on upstream data; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing secrets, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors (moderation, completion)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding and passage store errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Transport-level HTTP failures
    #[error("HTTP error: {0}")]
    Http(String),

    /// A collaborator call exceeded the configured deadline
    #[error("Timed out after {secs}s waiting for {operation}")]
    Timeout { operation: String, secs: u64 },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned to callers for every system-side failure.
pub const GENERIC_SYSTEM_MESSAGE: &str = "There was an error processing your request";

/// Failure of a single vector-search request.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid or disallowed input. Surfaced verbatim to the caller.
    #[error("{message}")]
    Caller {
        message: String,
        data: Option<Value>,
    },

    /// Unexpected or malformed upstream condition. Only logged.
    #[error("{message}")]
    System {
        message: String,
        detail: Option<String>,
    },
}

impl PipelineError {
    /// Caller error without structured data.
    pub fn caller(message: impl Into<String>) -> Self {
        Self::Caller {
            message: message.into(),
            data: None,
        }
    }

    /// Caller error carrying structured detail (e.g. moderation categories).
    pub fn caller_with_data(message: impl Into<String>, data: Value) -> Self {
        Self::Caller {
            message: message.into(),
            data: Some(data),
        }
    }

    /// System error with the upstream detail kept for the logs.
    pub fn system(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::System {
            message: message.into(),
            detail: Some(detail.to_string()),
        }
    }

    pub fn is_caller(&self) -> bool {
        matches!(self, Self::Caller { .. })
    }

    /// Message safe to show the caller.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Caller { message, .. } => message,
            Self::System { .. } => GENERIC_SYSTEM_MESSAGE,
        }
    }

    /// Log the failure at the level matching its kind.
    pub fn log(&self) {
        match self {
            Self::Caller { message, data } => {
                tracing::info!(error = %message, data = ?data, "Request rejected");
            }
            Self::System { message, detail } => match detail {
                Some(detail) => tracing::error!("{}: {}", message, detail),
                None => tracing::error!("{}", message),
            },
        }
    }
}

/// Unrecognized failures are system failures by default.
impl From<AppError> for PipelineError {
    fn from(err: AppError) -> Self {
        PipelineError::System {
            message: err.to_string(),
            detail: None,
        }
    }
}
