//! NotifyBlueprint - Config Loader output
//!
//! Describes the channel set: which channels exist, what they can deliver,
//! how long each may take.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete notification configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotifyBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Fan-out wide settings
    #[serde(default)]
    #[validate(nested)]
    pub fanout: FanoutSettings,

    /// Channels in registration order
    #[serde(default)]
    #[validate(nested)]
    pub channels: Vec<ChannelConfig>,
}

impl NotifyBlueprint {
    /// Channels declaring the given capability, in registration order
    pub fn channels_with(&self, capability: Capability) -> impl Iterator<Item = &ChannelConfig> {
        self.channels
            .iter()
            .filter(move |c| c.capabilities.contains(&capability))
    }

    /// Effective per-channel deadline
    pub fn timeout_for(&self, channel: &ChannelConfig) -> Duration {
        Duration::from_millis(channel.timeout_ms.unwrap_or(self.fanout.default_timeout_ms))
    }
}

/// Fan-out wide settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FanoutSettings {
    /// Deadline applied to channels without their own `timeout_ms`
    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1, max = 300_000))]
    pub default_timeout_ms: u64,
}

impl Default for FanoutSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Channel configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChannelConfig {
    /// Channel name, unique within the blueprint
    #[validate(length(min = 1, max = 64))]
    pub name: String,

    /// Channel type
    pub channel_type: ChannelType,

    /// Event families this channel receives
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<Capability>,

    /// Per-channel deadline
    #[serde(default)]
    #[validate(range(min = 1, max = 300_000))]
    pub timeout_ms: Option<u64>,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_capabilities() -> Vec<Capability> {
    vec![Capability::View, Capability::Comment]
}

/// Channel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// Log output
    Log,
    /// JSON-lines outbox file
    File,
    /// HTTP webhook
    Webhook,
}

/// Capability a channel is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// View and digest events
    View,
    /// Comment events
    Comment,
}
