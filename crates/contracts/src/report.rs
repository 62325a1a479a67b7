//! DispatchReport - opt-in result of one fan-out call
//!
//! The plain dispatch calls swallow channel outcomes. Callers that want
//! partial-failure visibility ask for a report instead.

use std::time::Duration;

use serde::Serialize;

use crate::EventKind;

/// Outcome of one channel attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
    TimedOut,
    /// Abandoned in flight because the dispatch was cancelled
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Per-channel entry of a [`DispatchReport`]
#[derive(Debug, Clone, Serialize)]
pub struct ChannelOutcome {
    pub channel: String,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed: Duration,
}

/// Result of one dispatch call across all registered channels
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub kind: EventKind,
    /// Attempted channels, in registration order
    pub outcomes: Vec<ChannelOutcome>,
    /// Channels never attempted because the dispatch was cancelled first
    pub skipped: usize,
    pub cancelled: bool,
}

impl DispatchReport {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            outcomes: Vec::new(),
            skipped: 0,
            cancelled: false,
        }
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.count(DeliveryStatus::Delivered)
    }

    /// Failures including timeouts
    pub fn failed(&self) -> usize {
        self.count(DeliveryStatus::Failed) + self.count(DeliveryStatus::TimedOut)
    }

    pub fn timed_out(&self) -> usize {
        self.count(DeliveryStatus::TimedOut)
    }

    /// Every registered channel was attempted and delivered
    pub fn is_complete_success(&self) -> bool {
        !self.cancelled && self.skipped == 0 && self.delivered() == self.attempted()
    }

    /// At least one channel failed and none delivered
    ///
    /// Attempts abandoned on cancel are not failures.
    pub fn all_failed(&self) -> bool {
        self.failed() > 0 && self.delivered() == 0
    }

    /// Channels whose attempt failed or timed out
    pub fn failed_channels(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DeliveryStatus::Failed | DeliveryStatus::TimedOut))
            .map(|o| o.channel.as_str())
    }

    fn count(&self, status: DeliveryStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}
