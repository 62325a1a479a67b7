//! # Notify Fanout CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 事件文件投递
//! - Ctrl+C 取消处理

mod cli;
mod commands;
mod error;
mod events;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_send, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(observability_config(&cli))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Notify Fanout CLI starting"
    );

    let result = match &cli.command {
        Commands::Send(args) => run_send(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Map global CLI flags onto the logging/metrics setup
fn observability_config(cli: &Cli) -> ObservabilityConfig {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: default_log_level.to_string(),
        force_level: cli.quiet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_forces_warn() {
        let cli = Cli::parse_from(["notify-fanout", "-q", "validate"]);
        let config = observability_config(&cli);
        assert_eq!(config.default_log_level, "warn");
        assert!(config.force_level);
        assert_eq!(config.metrics_port, None);
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::parse_from(["notify-fanout", "-vv", "--metrics-port", "9100", "info"]);
        let config = observability_config(&cli);
        assert_eq!(config.default_log_level, "trace");
        assert_eq!(config.metrics_port, Some(9100));
    }
}
