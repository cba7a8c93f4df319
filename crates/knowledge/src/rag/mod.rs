//! Vector-search answering pipeline.
//!
//! Moderates the question, embeds it, retrieves ranked sections, assembles a
//! token-budgeted context, renders the prompt and streams the completion.

pub mod pipeline;
pub mod types;

pub use pipeline::{AnswerStream, Collaborators, Pipeline};
pub use types::{parse_request, AskRequest, PipelineOptions, PipelineStage};
