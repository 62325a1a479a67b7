//! Layered error definitions
//!
//! Categorized by source: config / channel / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Channel Errors =====
    /// Channel could not complete delivery (transport error, local I/O, ...)
    #[error("channel '{channel}' delivery error: {message}")]
    ChannelDelivery { channel: String, message: String },

    /// Remote endpoint refused the notification
    #[error("channel '{channel}' rejected notification: status {status}")]
    ChannelRejected { channel: String, status: u16 },

    /// Channel did not finish within its deadline
    #[error("channel '{channel}' timed out after {timeout_ms}ms")]
    ChannelTimeout { channel: String, timeout_ms: u64 },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create channel delivery error
    pub fn channel_delivery(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelDelivery {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Create channel timeout error
    pub fn channel_timeout(channel: impl Into<String>, timeout_ms: u64) -> Self {
        Self::ChannelTimeout {
            channel: channel.into(),
            timeout_ms,
        }
    }

    /// Channel identity carried by a channel-level error, if any
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::ChannelDelivery { channel, .. }
            | Self::ChannelRejected { channel, .. }
            | Self::ChannelTimeout { channel, .. } => Some(channel),
            _ => None,
        }
    }

    /// Whether this error is a deadline expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ChannelTimeout { .. })
    }
}
