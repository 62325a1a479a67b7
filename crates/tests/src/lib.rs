//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> 构建 -> channel 的 e2e 测试（仅使用本地 wiremock）

#[cfg(test)]
mod contract_tests {
    use contracts::{EventKind, Notification, ViewEvent};

    #[test]
    fn test_notification_envelope_shape() {
        let notification = Notification::VideoViewed(ViewEvent::new(
            "user@example.com",
            "Alice",
            "Demo Video",
            "https://videos.example.com/watch/abc",
            5,
        ));

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["event"], "video_viewed");
        assert_eq!(json["view_count"], 5);
        assert_eq!(notification.kind(), EventKind::View);

        let back: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(back, notification);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ChannelFailure, CommentEvent, DeliveryObserver, DeliveryStatus, DigestEvent,
        DigestVideoSummary, EventKind, Notification, ViewEvent,
    };
    use fanout::{CancellationToken, FanoutBuilder, Fanouts, OutboxRecord};
    use observability::{DeliveryStatsAggregator, MetricsObserver};
    use tempfile::tempdir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct Recorder {
        failures: Mutex<Vec<(String, EventKind, bool)>>,
        delivered: Mutex<Vec<String>>,
    }

    impl DeliveryObserver for Recorder {
        fn on_failure(&self, failure: &ChannelFailure<'_>) {
            self.failures.lock().unwrap().push((
                failure.channel.to_string(),
                failure.kind,
                failure.error.is_timeout(),
            ));
        }

        fn on_delivered(&self, channel: &str, _kind: EventKind, _elapsed: Duration) {
            self.delivered.lock().unwrap().push(channel.to_string());
        }
    }

    fn view() -> ViewEvent {
        ViewEvent::new(
            "user@example.com",
            "Alice",
            "Demo Video",
            "https://videos.example.com/watch/abc",
            5,
        )
    }

    fn comment() -> CommentEvent {
        CommentEvent::new(
            "user@example.com",
            "Alice",
            "Demo Video",
            "Jane",
            "Great video!",
            "https://videos.example.com/watch/abc",
        )
    }

    async fn build(config: &str, recorder: &Arc<Recorder>) -> Fanouts {
        let blueprint = ConfigLoader::load_from_str(config, ConfigFormat::Toml).unwrap();
        let observer = Arc::new(MetricsObserver::new(recorder.clone()));
        FanoutBuilder::new(blueprint)
            .with_observer(observer)
            .build()
            .await
            .unwrap()
    }

    async fn outbox(path: &Path) -> Vec<OutboxRecord> {
        OutboxRecord::read_all(path).await.unwrap()
    }

    /// Failing webhook first, outbox second: the outbox still gets the comment
    /// and the caller sees success
    #[tokio::test]
    async fn test_e2e_failing_webhook_does_not_block_outbox() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let outbox_path = dir.path().join("outbox.jsonl");
        let config = format!(
            r#"
[[channels]]
name = "chat"
channel_type = "webhook"
capabilities = ["comment"]
params = {{ url = "{}/hook" }}

[[channels]]
name = "outbox"
channel_type = "file"
params = {{ path = "{}" }}
"#,
            server.uri(),
            outbox_path.display()
        );

        let recorder = Arc::new(Recorder::default());
        let fanouts = build(&config, &recorder).await;
        assert_eq!(fanouts.view.len(), 1);
        assert_eq!(fanouts.comment.len(), 2);

        let cancel = CancellationToken::new();
        fanouts
            .comment
            .dispatch_comment(&cancel, &comment())
            .await
            .unwrap();

        let records = outbox(&outbox_path).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].notification, Notification::NewComment(comment()));

        assert_eq!(
            *recorder.failures.lock().unwrap(),
            vec![("chat".to_string(), EventKind::Comment, false)]
        );
        assert_eq!(*recorder.delivered.lock().unwrap(), vec!["outbox".to_string()]);
    }

    /// View and digest reach only view-capable channels, in config order
    #[tokio::test]
    async fn test_e2e_capability_routing_and_order() {
        let dir = tempdir().unwrap();
        let views_path = dir.path().join("views.jsonl");
        let comments_path = dir.path().join("comments.jsonl");
        let config = format!(
            r#"
[[channels]]
name = "audit"
channel_type = "log"

[[channels]]
name = "views"
channel_type = "file"
capabilities = ["view"]
params = {{ path = "{}" }}

[[channels]]
name = "comments"
channel_type = "file"
capabilities = ["comment"]
params = {{ path = "{}" }}
"#,
            views_path.display(),
            comments_path.display()
        );

        let recorder = Arc::new(Recorder::default());
        let fanouts = build(&config, &recorder).await;
        let cancel = CancellationToken::new();

        let digest = DigestEvent::new(
            "user@example.com",
            "Alice",
            vec![
                DigestVideoSummary::new("Video 1", 10, 2, "https://videos.example.com/watch/1"),
                DigestVideoSummary::new("Video 2", 5, 0, "https://videos.example.com/watch/2"),
            ],
        );
        fanouts.view.dispatch_view(&cancel, &view()).await.unwrap();
        fanouts.view.dispatch_digest(&cancel, &digest).await.unwrap();

        let records = outbox(&views_path).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].notification, Notification::VideoViewed(view()));
        let Notification::Digest(received) = &records[1].notification else {
            panic!("expected digest record");
        };
        let titles: Vec<_> = received.summaries.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Video 1", "Video 2"]);

        assert!(outbox(&comments_path).await.is_empty());
        assert_eq!(
            *recorder.delivered.lock().unwrap(),
            vec!["audit", "views", "audit", "views"]
        );
    }

    /// A slow webhook is cut off by its own deadline; later channels still run
    #[tokio::test]
    async fn test_e2e_slow_webhook_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let outbox_path = dir.path().join("outbox.jsonl");
        let config = format!(
            r#"
[[channels]]
name = "slow"
channel_type = "webhook"
timeout_ms = 50
params = {{ url = "{}/hook" }}

[[channels]]
name = "outbox"
channel_type = "file"
params = {{ path = "{}" }}
"#,
            server.uri(),
            outbox_path.display()
        );

        let recorder = Arc::new(Recorder::default());
        let fanouts = build(&config, &recorder).await;

        let report = fanouts
            .view
            .dispatch_view_report(&CancellationToken::new(), &view())
            .await;

        assert_eq!(report.outcomes[0].status, DeliveryStatus::TimedOut);
        assert_eq!(report.outcomes[1].status, DeliveryStatus::Delivered);
        assert_eq!(outbox(&outbox_path).await.len(), 1);
        assert_eq!(
            *recorder.failures.lock().unwrap(),
            vec![("slow".to_string(), EventKind::View, true)]
        );

        let mut aggregator = DeliveryStatsAggregator::new();
        aggregator.update(&report);
        let summary = aggregator.summary();
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.channel_counts["slow"].timed_out, 1);
    }

    /// Cancelling while a channel is in flight abandons the rest of the list
    #[tokio::test]
    async fn test_e2e_cancel_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let outbox_path = dir.path().join("outbox.jsonl");
        let config = format!(
            r#"
[[channels]]
name = "slow"
channel_type = "webhook"
params = {{ url = "{}/hook" }}

[[channels]]
name = "outbox"
channel_type = "file"
params = {{ path = "{}" }}
"#,
            server.uri(),
            outbox_path.display()
        );

        let recorder = Arc::new(Recorder::default());
        let fanouts = build(&config, &recorder).await;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = fanouts
            .comment
            .dispatch_comment(&cancel, &comment())
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(outbox(&outbox_path).await.is_empty());
        assert!(recorder.failures.lock().unwrap().is_empty());
    }
}
