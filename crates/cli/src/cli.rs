//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Notify Fanout - deliver video notifications to every configured channel
#[derive(Parser, Debug)]
#[command(
    name = "notify-fanout",
    author,
    version,
    about = "Multi-channel notification fan-out",
    long_about = "Fans view, digest and comment notifications out to every configured channel.\n\n\
                  Channels are declared in a TOML or JSON file and registered by capability; \n\
                  one failing channel never blocks the others."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "NOTIFY_FANOUT_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "NOTIFY_FANOUT_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "NOTIFY_FANOUT_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deliver every event of a file through the configured channels
    Send(SendArgs),

    /// Validate configuration file without sending
    Validate(ValidateArgs),

    /// Display configured channels
    Info(InfoArgs),
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "notify.toml", env = "NOTIFY_FANOUT_CONFIG")]
    pub config: PathBuf,

    /// Event file: JSON lines, or a JSON array when the extension is `.json`
    #[arg(short, long)]
    pub events: PathBuf,

    /// Print the per-dispatch report of every event as JSON
    #[arg(long)]
    pub json: bool,

    /// Stop at the first event that fails validation instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "notify.toml", env = "NOTIFY_FANOUT_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "notify.toml", env = "NOTIFY_FANOUT_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show channel parameters (secrets are masked)
    #[arg(long)]
    pub params: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
