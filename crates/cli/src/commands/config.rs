//! Config command handler.

use clap::Args;
use docsearch_core::AppConfig;

/// Print the effective configuration as YAML
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Also validate values and check that secrets are set
    #[arg(long)]
    pub check: bool,
}

impl ConfigCommand {
    pub fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing config command");

        if let Some(path) = &config.config_file {
            eprintln!("# Loaded from {}", path.display());
        }
        print!("{}", config.to_yaml()?);

        if self.check {
            config.validate()?;
            config.resolve_secrets()?;
            eprintln!("Configuration OK");
        }

        Ok(())
    }
}
