//! Channel implementations
//!
//! Contains LogChannel, FileChannel, and WebhookChannel. Each implements both
//! capability traits.

mod file;
mod log;
mod webhook;

pub use self::file::{FileChannel, FileChannelConfig, OutboxRecord};
pub use self::log::LogChannel;
pub use self::webhook::{WebhookChannel, WebhookChannelConfig};

use contracts::{CommentEvent, DigestEvent, EventKind, ViewEvent};
use serde::Serialize;

/// Borrowed notification envelope
///
/// Serializes exactly like [`contracts::Notification`] without cloning the
/// event.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum Payload<'a> {
    VideoViewed(&'a ViewEvent),
    NewComment(&'a CommentEvent),
    Digest(&'a DigestEvent),
}

impl Payload<'_> {
    pub(crate) fn kind(&self) -> EventKind {
        match self {
            Self::VideoViewed(_) => EventKind::View,
            Self::NewComment(_) => EventKind::Comment,
            Self::Digest(_) => EventKind::Digest,
        }
    }
}
