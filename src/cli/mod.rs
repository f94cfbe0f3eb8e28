//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "odte")]
#[command(author, version, about = "Intraday 0DTE short-options trading engine")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the decision core against a recorded tick file with paper fills
    Paper(PaperArgs),
    /// Start live trading
    Live(LiveArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct PaperArgs {
    /// Tick file (CSV)
    #[arg(short, long)]
    pub ticks: PathBuf,

    /// Delay between replayed ticks in milliseconds (0 = as fast as possible)
    #[arg(long, default_value = "0")]
    pub tick_delay_ms: u64,
}

#[derive(clap::Args)]
pub struct LiveArgs {
    /// Enable dry run (no real orders)
    #[arg(long)]
    pub dry_run: bool,
}
