//! LogChannel - logs notification summaries via tracing

use async_trait::async_trait;
use contracts::{
    CommentEvent, CommentNotifier, ContractError, DigestEvent, NotificationChannel, ViewEvent,
    ViewNotifier,
};
use tracing::{info, instrument};

/// Channel that logs notifications for debugging and auditing
pub struct LogChannel {
    name: String,
}

impl LogChannel {
    /// Create a new LogChannel with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl NotificationChannel for LogChannel {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ViewNotifier for LogChannel {
    #[instrument(name = "log_channel_view", skip(self, event), fields(channel = %self.name))]
    async fn send_view_notification(&self, event: &ViewEvent) -> Result<(), ContractError> {
        info!(
            channel = %self.name,
            recipient = %event.recipient_email,
            video = %event.video_title,
            views = event.view_count,
            "Video viewed"
        );
        Ok(())
    }

    #[instrument(name = "log_channel_digest", skip(self, digest), fields(channel = %self.name))]
    async fn send_digest_notification(&self, digest: &DigestEvent) -> Result<(), ContractError> {
        let totals = digest.totals();
        info!(
            channel = %self.name,
            recipient = %digest.recipient_email,
            videos = totals.videos,
            views = totals.views,
            comments = totals.comments,
            top_video = digest.top_video().map(|s| s.title.as_str()).unwrap_or("-"),
            "Digest"
        );
        Ok(())
    }
}

#[async_trait]
impl CommentNotifier for LogChannel {
    #[instrument(name = "log_channel_comment", skip(self, event), fields(channel = %self.name))]
    async fn send_comment_notification(
        &self,
        event: &CommentEvent,
    ) -> Result<(), ContractError> {
        info!(
            channel = %self.name,
            recipient = %event.recipient_email,
            video = %event.video_title,
            author = %event.comment_author,
            body_len = event.comment_body.chars().count(),
            "New comment"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DigestVideoSummary;

    #[tokio::test]
    async fn test_log_channel_delivers_everything() {
        let channel = LogChannel::new("test_log");
        let view = ViewEvent::new(
            "user@example.com",
            "Alice",
            "Demo Video",
            "https://videos.example.com/watch/abc",
            5,
        );
        assert!(channel.send_view_notification(&view).await.is_ok());

        let digest = DigestEvent::new("user@example.com", "Alice", Vec::new()).with_summary(
            DigestVideoSummary::new("Video 1", 10, 2, "https://videos.example.com/watch/1"),
        );
        assert!(channel.send_digest_notification(&digest).await.is_ok());

        let comment = CommentEvent::new(
            "user@example.com",
            "Alice",
            "Demo Video",
            "Jane",
            "Great video!",
            "https://videos.example.com/watch/abc",
        );
        assert!(channel.send_comment_notification(&comment).await.is_ok());
    }

    #[test]
    fn test_log_channel_name() {
        let channel = LogChannel::new("my_logger");
        assert_eq!(channel.name(), "my_logger");
    }
}
