//! Notification payloads
//!
//! Events are ephemeral: built per call by the upstream handler, read-only for
//! every channel, never persisted by the fan-out layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationErrors};

use crate::DigestEvent;

/// Kind of notification being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A video was viewed
    View,
    /// Periodic rollup of several videos
    Digest,
    /// A new comment was posted
    Comment,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Digest => "digest",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// "Video viewed" notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ViewEvent {
    /// Recipient (video owner) email
    #[validate(email)]
    pub recipient_email: String,

    /// Recipient display name
    pub recipient_name: String,

    /// Title of the viewed video
    #[validate(length(min = 1))]
    pub video_title: String,

    /// Link to the watch page
    #[validate(url)]
    pub watch_url: String,

    /// Cumulative view count
    pub view_count: u64,
}

impl ViewEvent {
    pub fn new(
        recipient_email: impl Into<String>,
        recipient_name: impl Into<String>,
        video_title: impl Into<String>,
        watch_url: impl Into<String>,
        view_count: u64,
    ) -> Self {
        Self {
            recipient_email: recipient_email.into(),
            recipient_name: recipient_name.into(),
            video_title: video_title.into(),
            watch_url: watch_url.into(),
            view_count,
        }
    }
}

/// "New comment" notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CommentEvent {
    /// Recipient (video owner) email
    #[validate(email)]
    pub recipient_email: String,

    /// Recipient display name
    pub recipient_name: String,

    /// Title of the commented video
    #[validate(length(min = 1))]
    pub video_title: String,

    /// Display name of the comment author
    pub comment_author: String,

    /// Comment text, free form
    pub comment_body: String,

    /// Link to the watch page
    #[validate(url)]
    pub watch_url: String,
}

impl CommentEvent {
    pub fn new(
        recipient_email: impl Into<String>,
        recipient_name: impl Into<String>,
        video_title: impl Into<String>,
        comment_author: impl Into<String>,
        comment_body: impl Into<String>,
        watch_url: impl Into<String>,
    ) -> Self {
        Self {
            recipient_email: recipient_email.into(),
            recipient_name: recipient_name.into(),
            video_title: video_title.into(),
            comment_author: comment_author.into(),
            comment_body: comment_body.into(),
            watch_url: watch_url.into(),
        }
    }
}

/// Serialized notification envelope
///
/// Used by channels that ship the payload somewhere (outbox file, webhook)
/// and by event files fed to the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    VideoViewed(ViewEvent),
    NewComment(CommentEvent),
    Digest(DigestEvent),
}

impl Notification {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::VideoViewed(_) => EventKind::View,
            Self::NewComment(_) => EventKind::Comment,
            Self::Digest(_) => EventKind::Digest,
        }
    }

    pub fn recipient_email(&self) -> &str {
        match self {
            Self::VideoViewed(e) => &e.recipient_email,
            Self::NewComment(e) => &e.recipient_email,
            Self::Digest(d) => &d.recipient_email,
        }
    }

    /// Validate the wrapped payload
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::VideoViewed(e) => e.validate(),
            Self::NewComment(e) => e.validate(),
            Self::Digest(d) => d.validate(),
        }
    }
}
