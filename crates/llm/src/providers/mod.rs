//! LLM provider implementations.

pub mod openai;
pub(crate) mod sse;

pub use openai::OpenAiClient;
