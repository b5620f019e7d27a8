//! Scopehound CLI — the main entry point.
//!
//! Commands:
//! - `run`    — Drive a request file through the enrichment engine
//! - `tools`  — List the tool fleet with per-request budgets
//! - `config` — Print the default configuration as TOML

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "scopehound",
    about = "Scopehound — recursive context-gathering for website change-requests",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a request (JSON file) through the enrichment engine
    Run {
        /// Path to a RunInput JSON file
        input: PathBuf,

        /// Path to a config TOML file (defaults + env otherwise)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the tool fleet with budgets
    Tools,

    /// Print the default configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run { input, config } => commands::run::run(input, config).await?,
        Commands::Tools => commands::tools_cmd::run()?,
        Commands::Config => commands::config_cmd::run(),
    }

    Ok(())
}
