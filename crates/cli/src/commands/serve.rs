//! Serve command handler.
//!
//! Runs the HTTP service until interrupted.

use clap::Args;
use docsearch_core::AppConfig;
use std::sync::Arc;

/// Run the vector-search HTTP service
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (host:port)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing serve command");

        let pipeline = super::load_pipeline(config)?;
        docsearch_server::run(&config.server.bind, Arc::new(pipeline)).await?;

        Ok(())
    }
}
