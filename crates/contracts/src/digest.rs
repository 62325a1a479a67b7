//! Digest payload
//!
//! A digest is a periodic rollup: one message per recipient summarizing the
//! activity of several videos. Summary order is the order chosen by the
//! scheduler and is preserved all the way to every channel.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Activity of a single video within a digest period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DigestVideoSummary {
    #[validate(length(min = 1))]
    pub title: String,
    pub view_count: u64,
    pub comment_count: u64,
    #[validate(url)]
    pub watch_url: String,
}

impl DigestVideoSummary {
    pub fn new(
        title: impl Into<String>,
        view_count: u64,
        comment_count: u64,
        watch_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            view_count,
            comment_count,
            watch_url: watch_url.into(),
        }
    }

    /// Whether the video saw any activity in the period
    pub fn has_activity(&self) -> bool {
        self.view_count > 0 || self.comment_count > 0
    }
}

/// Digest notification for one recipient
///
/// An empty `summaries` list is a valid digest and is still delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DigestEvent {
    #[validate(email)]
    pub recipient_email: String,
    pub recipient_name: String,
    #[serde(default)]
    #[validate(nested)]
    pub summaries: Vec<DigestVideoSummary>,
}

impl DigestEvent {
    pub fn new(
        recipient_email: impl Into<String>,
        recipient_name: impl Into<String>,
        summaries: Vec<DigestVideoSummary>,
    ) -> Self {
        Self {
            recipient_email: recipient_email.into(),
            recipient_name: recipient_name.into(),
            summaries,
        }
    }

    /// Append a summary, keeping insertion order
    pub fn with_summary(mut self, summary: DigestVideoSummary) -> Self {
        self.summaries.push(summary);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// Aggregate counters across every summary
    ///
    /// View and comment sums saturate at `u64::MAX`.
    pub fn totals(&self) -> DigestTotals {
        self.summaries
            .iter()
            .fold(DigestTotals::default(), |mut acc, s| {
                acc.videos += 1;
                acc.views = acc.views.saturating_add(s.view_count);
                acc.comments = acc.comments.saturating_add(s.comment_count);
                if s.has_activity() {
                    acc.active_videos += 1;
                }
                acc
            })
    }

    /// Summary with the highest view count (first one wins on ties)
    pub fn top_video(&self) -> Option<&DigestVideoSummary> {
        self.summaries
            .iter()
            .reduce(|best, s| if s.view_count > best.view_count { s } else { best })
    }
}

/// Rolled-up digest counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestTotals {
    pub videos: usize,
    pub active_videos: usize,
    pub views: u64,
    pub comments: u64,
}
