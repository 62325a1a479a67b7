//! CommentNotificationFanout - comment events to every comment channel

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use contracts::{CommentEvent, CommentNotifier, DeliveryObserver, DispatchReport, EventKind};

use crate::delivery::{deliver_each, into_result};
use crate::error::FanoutError;
use crate::handle::ChannelHandle;
use crate::metrics::MetricsSnapshot;
use crate::observer::TracingObserver;

/// Fans comment events out to every registered [`CommentNotifier`]
///
/// Same discipline as [`ViewNotificationFanout`](crate::ViewNotificationFanout):
/// registration order, continue on failure, success to the caller.
pub struct CommentNotificationFanout {
    channels: Vec<ChannelHandle<dyn CommentNotifier>>,
    observer: Arc<dyn DeliveryObserver>,
}

impl CommentNotificationFanout {
    pub fn new(channels: Vec<ChannelHandle<dyn CommentNotifier>>) -> Self {
        Self {
            channels,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default [`TracingObserver`]
    pub fn with_observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|h| h.name())
    }

    /// Get metrics for all channels
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.channels
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Deliver a "new comment" event to every channel
    ///
    /// # Errors
    /// Only [`FanoutError::Cancelled`]; channel failures are swallowed.
    pub async fn dispatch_comment(
        &self,
        cancel: &CancellationToken,
        event: &CommentEvent,
    ) -> Result<(), FanoutError> {
        into_result(&self.dispatch_comment_report(cancel, event).await)
    }

    #[instrument(
        name = "comment_fanout_dispatch_comment",
        skip(self, cancel, event),
        fields(channels = self.channels.len())
    )]
    pub async fn dispatch_comment_report(
        &self,
        cancel: &CancellationToken,
        event: &CommentEvent,
    ) -> DispatchReport {
        deliver_each(
            &self.channels,
            EventKind::Comment,
            cancel,
            self.observer.as_ref(),
            |channel| channel.send_comment_notification(event),
        )
        .await
    }
}
