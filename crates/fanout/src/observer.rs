//! Default observer: channel outcomes as tracing events

use std::time::Duration;

use contracts::{ChannelFailure, DeliveryObserver, EventKind};
use tracing::{debug, warn};

/// Logs every failure at `warn` and every delivery at `debug`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DeliveryObserver for TracingObserver {
    fn on_failure(&self, failure: &ChannelFailure<'_>) {
        warn!(
            channel = %failure.channel,
            kind = %failure.kind,
            timed_out = failure.error.is_timeout(),
            error = %failure.error,
            "Channel delivery failed"
        );
    }

    fn on_delivered(&self, channel: &str, kind: EventKind, elapsed: Duration) {
        debug!(
            channel = %channel,
            kind = %kind,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Channel delivered"
        );
    }
}
