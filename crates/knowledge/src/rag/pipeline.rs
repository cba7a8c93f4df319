//! Request orchestration.
//!
//! A run walks `Validating → Moderating → Embedding → Retrieving →
//! Assembling → Completing → Streaming → Done`. Every stage either advances
//! or fails the whole run; nothing is retried.

use crate::context::{assemble_context, TokenCounter};
use crate::embeddings::EmbeddingProvider;
use crate::rag::types::{parse_request, sanitize, PipelineOptions, PipelineStage};
use crate::store::PassageStore;
use docsearch_core::{AppError, AppResult, PipelineError};
use docsearch_llm::{LlmClient, LlmRequest, LlmStream, ModerationClient};
use docsearch_prompt::PromptBuilder;
use futures::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Answer fragments forwarded to the caller, in arrival order.
///
/// Upstream failures after streaming started are logged and end the stream.
pub type AnswerStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// External services the pipeline depends on.
pub struct Collaborators {
    pub moderation: Arc<dyn ModerationClient>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn PassageStore>,
    pub completion: Arc<dyn LlmClient>,
    pub token_counter: Arc<dyn TokenCounter>,
}

/// The vector-search pipeline.
///
/// Holds only shared read-only collaborators; one instance serves every
/// request concurrently.
pub struct Pipeline {
    collaborators: Collaborators,
    prompt: PromptBuilder,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(collaborators: Collaborators, options: PipelineOptions) -> AppResult<Self> {
        Ok(Self {
            collaborators,
            prompt: PromptBuilder::new()?,
            options,
        })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run the pipeline for a raw JSON request body.
    pub async fn handle(&self, body: &[u8]) -> Result<AnswerStream, PipelineError> {
        tracing::debug!(stage = %PipelineStage::Validating, "Parsing request");
        let question = parse_request(body)?;
        self.run(question).await
    }

    /// Run the pipeline for a question.
    pub async fn ask(&self, question: &str) -> Result<AnswerStream, PipelineError> {
        tracing::debug!(stage = %PipelineStage::Validating, "Checking question");
        let question = sanitize(question)?;
        self.run(question).await
    }

    async fn run(&self, question: String) -> Result<AnswerStream, PipelineError> {
        let c = &self.collaborators;

        let verdict = self
            .step(PipelineStage::Moderating, c.moderation.moderate(&question))
            .await?;
        if verdict.flagged {
            return Err(PipelineError::caller_with_data(
                "Flagged content",
                verdict.to_caller_data(),
            ));
        }

        let embedding = self
            .step(PipelineStage::Embedding, c.embedder.embed(&question))
            .await?;

        let sections = self
            .step(
                PipelineStage::Retrieving,
                c.store.match_sections(&embedding, &self.options.match_params),
            )
            .await?;

        tracing::debug!(stage = %PipelineStage::Assembling, "Assembling context");
        let (context, included) = assemble_context(
            &sections,
            self.options.token_budget,
            c.token_counter.as_ref(),
        );
        let prompt = self
            .prompt
            .build(&context, &question)
            .map_err(|e| self.fail(PipelineStage::Assembling, e))?;

        tracing::info!(
            "Retrieved {} sections, {} within the {} token budget",
            sections.len(),
            included,
            self.options.token_budget
        );

        let request = LlmRequest::new(prompt, self.options.completion_model.clone())
            .with_streaming()
            .with_temperature(self.options.temperature)
            .with_max_tokens(self.options.max_tokens);

        let stream = self
            .step(PipelineStage::Completing, c.completion.stream(&request))
            .await?;

        tracing::debug!(stage = %PipelineStage::Streaming, "Forwarding completion stream");
        Ok(forward(stream))
    }

    /// Await one collaborator call under the configured deadline.
    async fn step<T, F>(&self, stage: PipelineStage, call: F) -> Result<T, PipelineError>
    where
        F: Future<Output = AppResult<T>>,
    {
        tracing::debug!(stage = %stage, "Entering stage");

        let outcome = match self.options.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(AppError::Timeout {
                    operation: stage.to_string(),
                    secs: limit.as_secs(),
                }),
            },
            None => call.await,
        };

        outcome.map_err(|e| self.fail(stage, e))
    }

    fn fail(&self, stage: PipelineStage, err: AppError) -> PipelineError {
        tracing::debug!(stage = %PipelineStage::Errored, failed_at = %stage, "Pipeline failed");
        PipelineError::system(format!("Pipeline failed while {}", stage), err)
    }
}

/// Pass fragments through until the provider stream ends or fails.
///
/// Dropping the returned stream drops the provider stream with it.
fn forward(stream: LlmStream) -> AnswerStream {
    Box::pin(futures::stream::unfold(
        Some((stream, 0usize)),
        |state| async move {
            let (mut stream, count) = state?;
            match stream.next().await {
                Some(Ok(fragment)) => Some((fragment, Some((stream, count + 1)))),
                Some(Err(e)) => {
                    tracing::error!("Completion stream failed after {} fragments: {}", count, e);
                    None
                }
                None => {
                    tracing::debug!(
                        stage = %PipelineStage::Done,
                        "Completion stream finished after {} fragments",
                        count
                    );
                    None
                }
            }
        },
    ))
}
