//! Ask command handler.
//!
//! Runs the vector-search pipeline once and streams the answer to stdout.

use clap::Args;
use docsearch_core::{AppConfig, PipelineError};
use futures::StreamExt;
use std::io::Write;
use std::process::ExitCode;

/// Exit code for a rejected question (missing or flagged).
const CALLER_ERROR_EXIT: u8 = 2;

/// Ask a question about the documentation
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Print the whole answer as a JSON object once complete
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<ExitCode> {
        tracing::info!("Executing ask command");

        let pipeline = super::load_pipeline(config)?;
        let question = self.question.join(" ");

        let mut stream = match pipeline.ask(&question).await {
            Ok(stream) => stream,
            Err(err) => return report(err),
        };

        let mut answer = String::new();
        let mut stdout = std::io::stdout();
        while let Some(fragment) = stream.next().await {
            if self.json {
                answer.push_str(&fragment);
            } else {
                // Stream to stdout in real-time
                write!(stdout, "{}", fragment)?;
                stdout.flush()?;
            }
        }

        if self.json {
            let output = serde_json::json!({
                "question": question.trim(),
                "answer": answer,
                "model": pipeline.options().completion_model,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!();
        }

        Ok(ExitCode::SUCCESS)
    }
}

/// Print a pipeline failure the way the HTTP surface would render it.
fn report(err: PipelineError) -> anyhow::Result<ExitCode> {
    err.log();
    match err {
        PipelineError::Caller { message, data } => {
            eprintln!("{}", message);
            if let Some(data) = data {
                eprintln!("{}", serde_json::to_string_pretty(&data)?);
            }
            Ok(ExitCode::from(CALLER_ERROR_EXIT))
        }
        system @ PipelineError::System { .. } => Err(system.into()),
    }
}
