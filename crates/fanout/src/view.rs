//! ViewNotificationFanout - view and digest events to every view channel

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use contracts::{DeliveryObserver, DigestEvent, DispatchReport, EventKind, ViewEvent, ViewNotifier};

use crate::delivery::{deliver_each, into_result};
use crate::error::FanoutError;
use crate::handle::ChannelHandle;
use crate::metrics::MetricsSnapshot;
use crate::observer::TracingObserver;

/// Fans view and digest events out to every registered [`ViewNotifier`]
///
/// The channel list is fixed at construction. Channel failures never reach
/// the caller: they are reported to the observer and dispatch moves on.
pub struct ViewNotificationFanout {
    channels: Vec<ChannelHandle<dyn ViewNotifier>>,
    observer: Arc<dyn DeliveryObserver>,
}

impl ViewNotificationFanout {
    /// Create a fan-out over `channels`, invoked in the given order
    pub fn new(channels: Vec<ChannelHandle<dyn ViewNotifier>>) -> Self {
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

    /// Registered channel names, in invocation order
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

    /// Deliver a "video viewed" event to every channel
    ///
    /// # Errors
    /// Only [`FanoutError::Cancelled`]; channel failures are swallowed.
    pub async fn dispatch_view(
        &self,
        cancel: &CancellationToken,
        event: &ViewEvent,
    ) -> Result<(), FanoutError> {
        into_result(&self.dispatch_view_report(cancel, event).await)
    }

    /// Deliver a digest to every channel, empty digests included
    ///
    /// # Errors
    /// Only [`FanoutError::Cancelled`]; channel failures are swallowed.
    pub async fn dispatch_digest(
        &self,
        cancel: &CancellationToken,
        digest: &DigestEvent,
    ) -> Result<(), FanoutError> {
        into_result(&self.dispatch_digest_report(cancel, digest).await)
    }

    /// Like [`dispatch_view`](Self::dispatch_view), returning per-channel outcomes
    #[instrument(
        name = "view_fanout_dispatch_view",
        skip(self, cancel, event),
        fields(channels = self.channels.len())
    )]
    pub async fn dispatch_view_report(
        &self,
        cancel: &CancellationToken,
        event: &ViewEvent,
    ) -> DispatchReport {
        deliver_each(
            &self.channels,
            EventKind::View,
            cancel,
            self.observer.as_ref(),
            |channel| channel.send_view_notification(event),
        )
        .await
    }

    /// Like [`dispatch_digest`](Self::dispatch_digest), returning per-channel outcomes
    #[instrument(
        name = "view_fanout_dispatch_digest",
        skip(self, cancel, digest),
        fields(channels = self.channels.len(), summaries = digest.len())
    )]
    pub async fn dispatch_digest_report(
        &self,
        cancel: &CancellationToken,
        digest: &DigestEvent,
    ) -> DispatchReport {
        deliver_each(
            &self.channels,
            EventKind::Digest,
            cancel,
            self.observer.as_ref(),
            |channel| channel.send_digest_notification(digest),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::LogChannel;
    use crate::test_support::*;
    use contracts::{DeliveryStatus, DigestVideoSummary, Notification};
    use std::time::Duration;

    fn fanout(channels: Vec<Arc<ScriptedChannel>>) -> ViewNotificationFanout {
        ViewNotificationFanout::new(channels.into_iter().map(ChannelHandle::view).collect())
    }

    #[tokio::test]
    async fn test_both_channels_receive_view() {
        let log = call_log();
        let fanout = fanout(vec![
            ScriptedChannel::new("email", Behavior::Succeed, &log),
            ScriptedChannel::new("webhook", Behavior::Succeed, &log),
        ]);

        let event = view_event();
        let result = fanout.dispatch_view(&CancellationToken::new(), &event).await;
        assert!(result.is_ok());

        let calls = calls(&log);
        assert_eq!(calls.len(), 2);
        for (_, payload) in &calls {
            assert_eq!(payload, &Notification::VideoViewed(event.clone()));
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_dispatch() {
        let log = call_log();
        let observer = Arc::new(RecordingObserver::default());
        let fanout = fanout(vec![
            ScriptedChannel::new("email", Behavior::Fail("email service down"), &log),
            ScriptedChannel::new("webhook", Behavior::Succeed, &log),
        ])
        .with_observer(observer.clone());

        let result = fanout
            .dispatch_view(&CancellationToken::new(), &view_event())
            .await;
        assert!(result.is_ok());

        let order: Vec<_> = calls(&log).into_iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["email", "webhook"]);

        let failures = observer.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "email");
        assert_eq!(failures[0].1, EventKind::View);
        assert!(failures[0].2.contains("email service down"));
        assert_eq!(observer.delivered(), vec![("webhook".to_string(), EventKind::View)]);
    }

    #[tokio::test]
    async fn test_all_channels_failing_still_succeeds() {
        let log = call_log();
        let fanout = fanout(vec![
            ScriptedChannel::new("a", Behavior::Fail("down"), &log),
            ScriptedChannel::new("b", Behavior::Fail("down"), &log),
            ScriptedChannel::new("c", Behavior::Fail("down"), &log),
        ])
        .with_observer(Arc::new(RecordingObserver::default()));

        let cancel = CancellationToken::new();
        assert!(fanout.dispatch_view(&cancel, &view_event()).await.is_ok());

        let report = fanout.dispatch_view_report(&cancel, &view_event()).await;
        assert!(report.all_failed());
        assert_eq!(report.attempted(), 3);
        assert_eq!(calls(&log).len(), 6);
    }

    #[tokio::test]
    async fn test_digest_summaries_delivered_in_order() {
        let log = call_log();
        let fanout = fanout(vec![
            ScriptedChannel::new("email", Behavior::Succeed, &log),
            ScriptedChannel::new("chat", Behavior::Succeed, &log),
        ]);

        let digest = DigestEvent::new(
            "user@example.com",
            "Alice",
            vec![
                DigestVideoSummary::new("Video 1", 10, 2, "https://videos.example.com/watch/1"),
                DigestVideoSummary::new("Video 2", 5, 0, "https://videos.example.com/watch/2"),
            ],
        );
        let report = fanout
            .dispatch_digest_report(&CancellationToken::new(), &digest)
            .await;
        assert!(report.is_complete_success());
        assert_eq!(report.kind, EventKind::Digest);

        for (_, payload) in calls(&log) {
            let Notification::Digest(received) = payload else {
                panic!("expected digest payload");
            };
            assert_eq!(received.summaries, digest.summaries);
        }
    }

    #[tokio::test]
    async fn test_huge_digest_counts_reach_later_channels() {
        let log = call_log();
        let fanout = ViewNotificationFanout::new(vec![
            ChannelHandle::view(Arc::new(LogChannel::new("audit"))),
            ChannelHandle::view(ScriptedChannel::new("email", Behavior::Succeed, &log)),
        ]);

        let digest = DigestEvent::new(
            "user@example.com",
            "Alice",
            vec![
                DigestVideoSummary::new("Viral", u64::MAX, 0, "https://videos.example.com/watch/1"),
                DigestVideoSummary::new("Video 2", 1, 0, "https://videos.example.com/watch/2"),
            ],
        );
        let report = fanout
            .dispatch_digest_report(&CancellationToken::new(), &digest)
            .await;

        assert!(report.is_complete_success());
        assert_eq!(calls(&log), vec![("email".to_string(), Notification::Digest(digest))]);
    }

    #[tokio::test]
    async fn test_empty_digest_is_delivered() {
        let log = call_log();
        let fanout = fanout(vec![
            ScriptedChannel::new("email", Behavior::Succeed, &log),
            ScriptedChannel::new("chat", Behavior::Succeed, &log),
        ]);

        let digest = DigestEvent::new("user@example.com", "Alice", Vec::new());
        fanout
            .dispatch_digest(&CancellationToken::new(), &digest)
            .await
            .unwrap();

        assert_eq!(calls(&log).len(), 2);
    }

    #[tokio::test]
    async fn test_no_channels_is_silent_noop() {
        let observer = Arc::new(RecordingObserver::default());
        let fanout = ViewNotificationFanout::new(Vec::new()).with_observer(observer.clone());
        assert!(fanout.is_empty());

        let report = fanout
            .dispatch_view_report(&CancellationToken::new(), &view_event())
            .await;
        assert!(report.is_complete_success());
        assert!(report.outcomes.is_empty());
        assert!(observer.failures().is_empty());
        assert!(observer.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_hanging_channel_is_cut_off() {
        let log = call_log();
        let observer = Arc::new(RecordingObserver::default());
        let fanout = ViewNotificationFanout::new(vec![
            ChannelHandle::view(ScriptedChannel::new("stuck", Behavior::Hang, &log))
                .with_timeout(Duration::from_millis(20)),
            ChannelHandle::view(ScriptedChannel::new("email", Behavior::Succeed, &log)),
        ])
        .with_observer(observer.clone());

        let report = fanout
            .dispatch_view_report(&CancellationToken::new(), &view_event())
            .await;

        assert_eq!(report.outcomes[0].status, DeliveryStatus::TimedOut);
        assert_eq!(report.outcomes[1].status, DeliveryStatus::Delivered);
        assert_eq!(observer.failures().len(), 1);
        assert!(observer.failures()[0].2.contains("timed out"));

        let metrics = fanout.metrics();
        assert_eq!(metrics[0].1.timeout_count, 1);
        assert_eq!(metrics[1].1.delivered_count, 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_dispatch_skips_all() {
        let log = call_log();
        let fanout = fanout(vec![
            ScriptedChannel::new("email", Behavior::Succeed, &log),
            ScriptedChannel::new("chat", Behavior::Succeed, &log),
        ]);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fanout.dispatch_view(&cancel, &view_event()).await.unwrap_err();
        assert!(matches!(
            err,
            FanoutError::Cancelled {
                kind: EventKind::View,
                skipped: 2
            }
        ));
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn test_cancel_in_flight_stops_remaining() {
        let log = call_log();
        let fanout = fanout(vec![
            ScriptedChannel::new("email", Behavior::Succeed, &log),
            ScriptedChannel::new("stuck", Behavior::Hang, &log),
            ScriptedChannel::new("chat", Behavior::Succeed, &log),
        ]);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let report = fanout.dispatch_view_report(&cancel, &view_event()).await;
        assert!(report.cancelled);
        assert_eq!(report.delivered(), 1);
        assert_eq!(report.outcomes[1].status, DeliveryStatus::Cancelled);
        assert_eq!(report.skipped, 1);

        let order: Vec<_> = calls(&log).into_iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["email", "stuck"]);
    }

    #[tokio::test]
    async fn test_concurrent_dispatch_shares_fanout() {
        let log = call_log();
        let fanout = Arc::new(fanout(vec![
            ScriptedChannel::new("email", Behavior::Succeed, &log),
            ScriptedChannel::new("chat", Behavior::Succeed, &log),
        ]));

        let mut tasks = Vec::new();
        for count in 0..4u64 {
            let fanout = Arc::clone(&fanout);
            tasks.push(tokio::spawn(async move {
                let mut event = view_event();
                event.view_count = count;
                fanout.dispatch_view(&CancellationToken::new(), &event).await
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        assert_eq!(calls(&log).len(), 8);
        let metrics = fanout.metrics();
        assert_eq!(metrics[0].1.delivered_count, 4);
        assert_eq!(metrics[1].1.attempt_count, 4);
    }
}
