//! DeliveryObserver - per-channel outcome side channel
//!
//! Fan-outs never hand channel failures back to the event source. Operators
//! see them through an observer injected at construction.

use std::time::Duration;

use crate::{ContractError, EventKind};

/// One failed delivery attempt
#[derive(Debug, Clone, Copy)]
pub struct ChannelFailure<'a> {
    pub channel: &'a str,
    pub kind: EventKind,
    pub error: &'a ContractError,
}

/// Receives per-channel delivery outcomes
pub trait DeliveryObserver: Send + Sync {
    /// Called once per failed (or timed out) channel attempt
    fn on_failure(&self, failure: &ChannelFailure<'_>);

    /// Called once per successful channel attempt
    fn on_delivered(&self, _channel: &str, _kind: EventKind, _elapsed: Duration) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DeliveryObserver for NoopObserver {
    fn on_failure(&self, _failure: &ChannelFailure<'_>) {}
}
