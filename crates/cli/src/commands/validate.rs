//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{Capability, ChannelType, NotifyBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    default_timeout_ms: u64,
    channel_count: usize,
    view_channels: usize,
    comment_channels: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    default_timeout_ms: blueprint.fanout.default_timeout_ms,
                    channel_count: blueprint.channels.len(),
                    view_channels: blueprint.channels_with(Capability::View).count(),
                    comment_channels: blueprint.channels_with(Capability::Comment).count(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &NotifyBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.channels.is_empty() {
        warnings.push("No channels configured - every notification will be dropped".to_string());
        return warnings;
    }

    if blueprint.channels_with(Capability::View).next().is_none() {
        warnings.push("No channel accepts view or digest notifications".to_string());
    }
    if blueprint.channels_with(Capability::Comment).next().is_none() {
        warnings.push("No channel accepts comment notifications".to_string());
    }

    if blueprint
        .channels
        .iter()
        .all(|c| c.channel_type == ChannelType::Log)
    {
        warnings.push("Only log channels configured - nothing leaves this process".to_string());
    }

    for channel in &blueprint.channels {
        if channel.channel_type != ChannelType::Webhook {
            continue;
        }
        let plain_http = channel
            .params
            .get("url")
            .is_some_and(|url| url.starts_with("http://"));
        if plain_http && channel.params.contains_key("bearer_token") {
            warnings.push(format!(
                "Channel '{}' sends a bearer token over plain http",
                channel.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Default timeout: {} ms", summary.default_timeout_ms);
            println!("  Channels: {}", summary.channel_count);
            println!("  View/digest channels: {}", summary.view_channels);
            println!("  Comment channels: {}", summary.comment_channels);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
