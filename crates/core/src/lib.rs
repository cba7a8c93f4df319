//! docsearch core library
//!
//! Foundational utilities shared by every docsearch crate:
//! - Error handling (`AppError`, `AppResult`, `PipelineError`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, PipelineError, GENERIC_SYSTEM_MESSAGE};
