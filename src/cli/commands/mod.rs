//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod config_cmd;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "textnerl")]
#[command(about = "Entity linking, named entity and keyphrase analysis for text")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze text and print the response envelope as JSON
    Analyze {
        /// Text to analyze (reads stdin when neither TEXT nor --file is given)
        text: Option<String>,
        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to bind to: "host:port", "port" or "host" (default from config)
        bind: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::load_from_path(path).await?
        }
        None => Config::load().await?,
    };
    if let Some(ref source) = config.source_path {
        tracing::info!("Loaded config from {}", source.display());
    }
    Ok(config)
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref()).await?;

    match cli.command {
        Commands::Analyze { text, file, pretty } => {
            analyze::cmd_analyze(&config, text, file, pretty).await
        }
        Commands::Serve { bind } => serve::cmd_serve(&config, bind.as_deref()).await,
        Commands::Config => config_cmd::cmd_config_show(&config),
    }
}
