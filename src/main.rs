//! Switchyard CLI entry point.

use clap::Parser;

use switchyard::cli::{self, Cli};
use switchyard::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    let config = match cli::load_config(&cli) {
        Ok(config) => config,
        Err(err) => cli::handle_error(err, json_mode),
    };

    // Held for the life of the process so buffered file logs are flushed.
    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => cli::handle_error(err, json_mode),
    };

    if let Err(err) = cli::run(cli, config).await {
        cli::handle_error(err, json_mode);
    }
}
