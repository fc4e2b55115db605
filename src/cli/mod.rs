//! Command-line interface for Switchyard.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::domain::models::RuntimeConfig;
use crate::infrastructure::config::ConfigLoader;

#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(about = "Run and inspect protocol adapters", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to switchyard.yaml plus local overrides)
    #[arg(short, long, global = true, env = "SWITCHYARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the configuration and list the adapters it defines
    Validate,
    /// Initialize adapters and run their connection checks
    Test {
        /// Adapter name (omit to test every adapter)
        name: Option<String>,
    },
    /// Poll an inbound adapter and print what it fetches
    Poll {
        /// Adapter name
        name: String,
        /// Stop after this many seconds (runs until Ctrl-C when omitted)
        #[arg(long)]
        duration_secs: Option<u64>,
    },
    /// Send one payload through an outbound adapter
    Send {
        /// Adapter name
        name: String,
        /// Text payload
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        /// Read the payload from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Load and validate configuration for the given CLI arguments.
pub fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Dispatch a parsed command.
pub async fn run(cli: Cli, config: RuntimeConfig) -> Result<()> {
    match cli.command {
        Commands::Validate => commands::validate::execute(&config, cli.json),
        Commands::Test { name } => commands::test::execute(&config, name.as_deref(), cli.json).await,
        Commands::Poll {
            name,
            duration_secs,
        } => commands::poll::execute(&config, &name, duration_secs, cli.json).await,
        Commands::Send { name, text, file } => {
            commands::send::execute(&config, &name, text, file, cli.json).await
        }
    }
}

/// Report a command error and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
