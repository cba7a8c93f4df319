//! Prompt system for docsearch.
//!
//! Renders the fixed answer instruction around the retrieved context block
//! and the user's question, using Handlebars with escaping disabled.

pub mod builder;
pub mod types;

// Re-export main types
pub use builder::PromptBuilder;
pub use types::{PromptInput, ANSWER_TEMPLATE};
