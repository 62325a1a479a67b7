//! Channel capability traits - fan-out output interface
//!
//! A channel implements one or both capabilities. Fan-outs hold them as
//! `Arc<dyn ViewNotifier>` / `Arc<dyn CommentNotifier>`, so the traits stay
//! object safe.

use async_trait::async_trait;

use crate::{CommentEvent, ContractError, DigestEvent, ViewEvent};

/// Identity shared by every channel
///
/// Channels are invoked concurrently with distinct events and must be
/// reentrant.
pub trait NotificationChannel: Send + Sync {
    /// Channel name (used for logging/metrics)
    fn name(&self) -> &str;
}

/// View and digest delivery capability
#[async_trait]
pub trait ViewNotifier: NotificationChannel {
    /// Deliver a "video viewed" notification
    ///
    /// # Errors
    /// Returns a channel error carrying this channel's name
    async fn send_view_notification(&self, event: &ViewEvent) -> Result<(), ContractError>;

    /// Deliver a digest rollup; an empty digest is still delivered
    async fn send_digest_notification(&self, digest: &DigestEvent) -> Result<(), ContractError>;
}

/// Comment delivery capability
#[async_trait]
pub trait CommentNotifier: NotificationChannel {
    /// Deliver a "new comment" notification
    ///
    /// # Errors
    /// Returns a channel error carrying this channel's name
    async fn send_comment_notification(&self, event: &CommentEvent)
        -> Result<(), ContractError>;
}
