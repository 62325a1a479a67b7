//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! notification payloads, the channel capability traits, the configuration
//! blueprint and the per-dispatch report.
//! Business crates depend on this crate only, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - A channel is anything implementing [`ViewNotifier`] and/or [`CommentNotifier`]
//! - Channel failures are values ([`ContractError`]), never panics
//! - Failures are surfaced through a [`DeliveryObserver`], not to the event source

mod blueprint;
mod digest;
mod error;
mod event;
mod notifier;
mod observer;
mod report;

pub use blueprint::*;
pub use digest::{DigestEvent, DigestTotals, DigestVideoSummary};
pub use error::*;
pub use event::*;
pub use notifier::{CommentNotifier, NotificationChannel, ViewNotifier};
pub use observer::{ChannelFailure, DeliveryObserver, NoopObserver};
pub use report::*;
