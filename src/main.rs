//! 0DTE trading engine CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use odte_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; the optional log file comes from the config when it
    // loads. Commands report config errors properly themselves.
    let log_level = match cli.log_level {
        cli::LogLevel::Trace => "trace",
        cli::LogLevel::Debug => "debug",
        cli::LogLevel::Info => "info",
        cli::LogLevel::Warn => "warn",
        cli::LogLevel::Error => "error",
    };
    let log_file = odte_config::load_config(&cli.config)
        .ok()
        .and_then(|config| config.logging.file);
    let _log_guard = setup_logging(log_level, cli.json_logs, log_file.as_deref());

    // Execute command
    match cli.command {
        Commands::Paper(args) => cli::commands::paper::run(args, &cli.config).await,
        Commands::Live(args) => cli::commands::live::run(args, &cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
