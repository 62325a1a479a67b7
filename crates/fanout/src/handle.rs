//! ChannelHandle - one registration in a fan-out list

use std::sync::Arc;
use std::time::Duration;

use contracts::{CommentNotifier, NotificationChannel, ViewNotifier};

use crate::metrics::ChannelMetrics;

/// Handle to a registered channel
///
/// Holds the channel, its per-channel deadline and its metrics. The same
/// channel may be registered in several fan-outs; each registration keeps
/// its own metrics.
pub struct ChannelHandle<N: ?Sized> {
    /// Channel name
    name: String,
    /// Shared channel implementation
    notifier: Arc<N>,
    /// Deadline for one delivery attempt (None = unbounded)
    timeout: Option<Duration>,
    /// Shared metrics
    metrics: Arc<ChannelMetrics>,
}

impl<N: NotificationChannel + ?Sized> ChannelHandle<N> {
    /// Wrap a channel, taking its identity from [`NotificationChannel::name`]
    pub fn new(notifier: Arc<N>) -> Self {
        Self {
            name: notifier.name().to_string(),
            notifier,
            timeout: None,
            metrics: Arc::new(ChannelMetrics::new()),
        }
    }

    /// Bound every delivery attempt on this channel
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get channel name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<ChannelMetrics> {
        &self.metrics
    }
}

impl ChannelHandle<dyn ViewNotifier> {
    /// Register a concrete channel for view and digest events
    pub fn view<C: ViewNotifier + 'static>(channel: Arc<C>) -> Self {
        Self::new(channel)
    }
}

impl ChannelHandle<dyn CommentNotifier> {
    /// Register a concrete channel for comment events
    pub fn comment<C: CommentNotifier + 'static>(channel: Arc<C>) -> Self {
        Self::new(channel)
    }
}

impl<N: ?Sized> std::fmt::Debug for ChannelHandle<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
