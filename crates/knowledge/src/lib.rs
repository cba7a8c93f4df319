//! Retrieval-augmented answering over a documentation corpus.
//!
//! Provides the embedder, the passage store client, token-budgeted context
//! assembly and the request pipeline that ties them to the LLM crate.

pub mod context;
pub mod embeddings;
pub mod factory;
pub mod rag;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use context::{assemble_context, BpeTokenCounter, TokenCounter, CONTEXT_SEPARATOR};
pub use embeddings::{EmbeddingProvider, OpenAiEmbeddingProvider};
pub use factory::build_pipeline;
pub use rag::{
    parse_request, AnswerStream, AskRequest, Collaborators, Pipeline, PipelineOptions,
    PipelineStage,
};
pub use store::{PassageStore, SupabaseStore};
pub use types::{MatchParams, PageSection};
