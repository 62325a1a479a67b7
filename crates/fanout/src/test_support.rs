//! Test doubles shared by the fan-out unit tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use contracts::{
    ChannelFailure, CommentEvent, CommentNotifier, ContractError, DeliveryObserver, DigestEvent,
    EventKind, Notification, NotificationChannel, ViewEvent, ViewNotifier,
};

/// Shared invocation log: (channel, payload) in call order
pub type CallLog = Arc<Mutex<Vec<(String, Notification)>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<(String, Notification)> {
    log.lock().unwrap().clone()
}

/// How a scripted channel behaves
#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    Fail(&'static str),
    Hang,
}

/// Channel that records every call into a shared log
pub struct ScriptedChannel {
    name: String,
    behavior: Behavior,
    log: CallLog,
}

impl ScriptedChannel {
    pub fn new(name: &str, behavior: Behavior, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            log: Arc::clone(log),
        })
    }

    async fn record(&self, notification: Notification) -> Result<(), ContractError> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), notification));
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(message) => Err(ContractError::channel_delivery(&self.name, message)),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

impl NotificationChannel for ScriptedChannel {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ViewNotifier for ScriptedChannel {
    async fn send_view_notification(&self, event: &ViewEvent) -> Result<(), ContractError> {
        self.record(Notification::VideoViewed(event.clone())).await
    }

    async fn send_digest_notification(&self, digest: &DigestEvent) -> Result<(), ContractError> {
        self.record(Notification::Digest(digest.clone())).await
    }
}

#[async_trait]
impl CommentNotifier for ScriptedChannel {
    async fn send_comment_notification(
        &self,
        event: &CommentEvent,
    ) -> Result<(), ContractError> {
        self.record(Notification::NewComment(event.clone())).await
    }
}

/// Observer that remembers (channel, kind, error) of each failure
#[derive(Default)]
pub struct RecordingObserver {
    pub failures: Mutex<Vec<(String, EventKind, String)>>,
    pub delivered: Mutex<Vec<(String, EventKind)>>,
}

impl RecordingObserver {
    pub fn failures(&self) -> Vec<(String, EventKind, String)> {
        self.failures.lock().unwrap().clone()
    }

    pub fn delivered(&self) -> Vec<(String, EventKind)> {
        self.delivered.lock().unwrap().clone()
    }
}

impl DeliveryObserver for RecordingObserver {
    fn on_failure(&self, failure: &ChannelFailure<'_>) {
        self.failures.lock().unwrap().push((
            failure.channel.to_string(),
            failure.kind,
            failure.error.to_string(),
        ));
    }

    fn on_delivered(&self, channel: &str, kind: EventKind, _elapsed: Duration) {
        self.delivered
            .lock()
            .unwrap()
            .push((channel.to_string(), kind));
    }
}

pub fn view_event() -> ViewEvent {
    ViewEvent::new(
        "user@example.com",
        "Alice",
        "Demo Video",
        "https://videos.example.com/watch/abc",
        5,
    )
}

pub fn comment_event() -> CommentEvent {
    CommentEvent::new(
        "user@example.com",
        "Alice",
        "Demo Video",
        "Jane",
        "Great video!",
        "https://videos.example.com/watch/abc",
    )
}
