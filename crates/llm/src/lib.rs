//! LLM integration crate for docsearch.
//!
//! Provider-agnostic abstractions for the two LLM-side collaborators of the
//! vector-search pipeline:
//! - [`ModerationClient`]: the content gate
//! - [`LlmClient`]: streamed chat completions
//!
//! # Providers
//! - **OpenAI** (and OpenAI-compatible endpoints)
//!
//! # Example
//! ```no_run
//! use docsearch_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//! use futures::StreamExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...")?;
//! let request = LlmRequest::new("Hello, world!", "gpt-3.5-turbo").with_streaming();
//! let mut stream = client.stream(&request).await?;
//! while let Some(fragment) = stream.next().await {
//!     print!("{}", fragment?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod moderation;
pub mod providers;

// Re-export main types
pub use client::{ChatMessage, LlmClient, LlmRequest, LlmStream};
pub use factory::create_client;
pub use moderation::{ModerationClient, ModerationVerdict};
pub use providers::OpenAiClient;
