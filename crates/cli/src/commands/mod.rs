//! Command handlers for the docsearch CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod config;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use config::ConfigCommand;
pub use serve::ServeCommand;

use anyhow::Context;
use docsearch_core::AppConfig;
use docsearch_knowledge::{build_pipeline, Pipeline};

/// Validate the configuration, resolve secrets and wire the pipeline.
pub(crate) fn load_pipeline(config: &AppConfig) -> anyhow::Result<Pipeline> {
    config.validate().context("Invalid configuration")?;
    let secrets = config
        .resolve_secrets()
        .context("Failed to resolve secrets")?;
    tracing::debug!("Resolved secrets: {:?}", secrets);

    build_pipeline(config, &secrets).context("Failed to build pipeline")
}
