//! Fanout error types

use contracts::EventKind;
use thiserror::Error;

/// Fanout-specific errors
///
/// Channel delivery failures never show up here; they go to the observer.
#[derive(Debug, Error)]
pub enum FanoutError {
    /// Channel creation error
    #[error("failed to create channel '{name}': {message}")]
    ChannelCreation { name: String, message: String },

    /// Dispatch stopped by its cancellation token
    #[error("{kind} dispatch cancelled, {skipped} channel(s) not attempted")]
    Cancelled { kind: EventKind, skipped: usize },

    /// Contract error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl FanoutError {
    /// Create a channel creation error
    pub fn channel_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
