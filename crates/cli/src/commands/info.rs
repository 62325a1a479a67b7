//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::{Capability, ChannelConfig, NotifyBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Params whose values never get printed
const SECRET_PARAMS: &[&str] = &["bearer_token"];

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    default_timeout_ms: u64,
    channels: Vec<ChannelInfo>,
}

#[derive(Serialize)]
struct ChannelInfo {
    name: String,
    channel_type: String,
    capabilities: Vec<Capability>,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint, args.params);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &NotifyBlueprint, with_params: bool) -> ConfigInfo {
    let channels = blueprint
        .channels
        .iter()
        .map(|c| ChannelInfo {
            name: c.name.clone(),
            channel_type: format!("{:?}", c.channel_type).to_lowercase(),
            capabilities: c.capabilities.clone(),
            timeout_ms: blueprint.timeout_for(c).as_millis() as u64,
            params: if with_params {
                masked_params(c)
            } else {
                BTreeMap::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        default_timeout_ms: blueprint.fanout.default_timeout_ms,
        channels,
    }
}

fn masked_params(channel: &ChannelConfig) -> BTreeMap<String, String> {
    channel
        .params
        .iter()
        .map(|(key, value)| {
            let shown = if SECRET_PARAMS.contains(&key.as_str()) {
                "***".to_string()
            } else {
                value.clone()
            };
            (key.clone(), shown)
        })
        .collect()
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Notify Fanout Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("⚙️  Fan-out");
    println!("   ├─ Version: {}", info.version);
    println!("   └─ Default timeout: {} ms", info.default_timeout_ms);

    println!("\n📤 Channels ({})", info.channels.len());
    for (i, channel) in info.channels.iter().enumerate() {
        let is_last = i == info.channels.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let capabilities: Vec<&str> = channel
            .capabilities
            .iter()
            .map(|c| match c {
                Capability::View => "view",
                Capability::Comment => "comment",
            })
            .collect();

        println!(
            "   {} {} ({}, {} ms) [{}]",
            prefix,
            channel.name,
            channel.channel_type,
            channel.timeout_ms,
            capabilities.join(", ")
        );
        for (key, value) in &channel.params {
            println!("   {}  · {} = {}", child_prefix, key, value);
        }
    }

    println!();
}
