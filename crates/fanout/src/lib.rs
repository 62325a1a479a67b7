//! # Fanout
//!
//! 通知分发模块。
//!
//! 负责：
//! - 将单个事件按注册顺序投递到全部 channel
//! - 隔离失败 channel，不阻塞上游事件源
//! - 每个 channel 的超时与取消控制

pub mod builder;
pub mod channels;
mod delivery;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod observer;
pub mod view;
pub mod comment;

#[cfg(test)]
mod test_support;

pub use builder::{FanoutBuilder, Fanouts, create_fanouts};
pub use channels::{FileChannel, LogChannel, OutboxRecord, WebhookChannel};
pub use comment::CommentNotificationFanout;
pub use contracts::{
    CommentEvent, CommentNotifier, DeliveryObserver, DigestEvent, DispatchReport, ViewEvent,
    ViewNotifier,
};
pub use error::FanoutError;
pub use handle::ChannelHandle;
pub use metrics::{ChannelMetrics, MetricsSnapshot};
pub use observer::TracingObserver;
pub use tokio_util::sync::CancellationToken;
pub use view::ViewNotificationFanout;
