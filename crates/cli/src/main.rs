//! docsearch CLI
//!
//! Main entry point for the docsearch command-line tool.
//! Serves the vector-search API or answers a single question.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ConfigCommand, ServeCommand};
use docsearch_core::{config::AppConfig, logging};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Instrument;

/// docsearch - answer questions about your documentation
#[derive(Parser, Debug)]
#[command(name = "docsearch")]
#[command(about = "Retrieval-augmented answers over a documentation corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "DOCSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Show the effective configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Command failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Load base configuration from file and environment
    let config = AppConfig::load_from(cli.config)?;

    // Apply CLI overrides
    let bind = match &cli.command {
        Commands::Serve(cmd) => cmd.bind.clone(),
        _ => None,
    };
    let config = config.with_overrides(
        bind,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.log_json,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("docsearch starting");
    tracing::debug!(
        "Config file: {:?} (verbose: {})",
        config.config_file,
        config.verbose
    );

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Config(_) => "config",
    };
    let span = tracing::info_span!("command", name = command_name);

    // Route to command handlers
    let result = async {
        match cli.command {
            Commands::Serve(cmd) => cmd.execute(&config).await.map(|_| ExitCode::SUCCESS),
            Commands::Ask(cmd) => cmd.execute(&config).await,
            Commands::Config(cmd) => cmd.execute(&config).map(|_| ExitCode::SUCCESS),
        }
    }
    .instrument(span)
    .await;

    if result.is_ok() {
        tracing::info!("Command completed");
    }

    result
}
