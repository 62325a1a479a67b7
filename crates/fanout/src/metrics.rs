//! Channel metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single channel registration
#[derive(Debug, Default)]
pub struct ChannelMetrics {
    /// Total attempts
    attempt_count: AtomicU64,
    /// Total successful deliveries
    delivered_count: AtomicU64,
    /// Total failed deliveries (timeouts excluded)
    failure_count: AtomicU64,
    /// Total attempts cut off by the deadline
    timeout_count: AtomicU64,
}

impl ChannelMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get attempt count
    pub fn attempt_count(&self) -> u64 {
        self.attempt_count.load(Ordering::Relaxed)
    }

    /// Increment attempt count
    pub fn inc_attempt_count(&self) {
        self.attempt_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get delivered count
    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    /// Increment delivered count
    pub fn inc_delivered_count(&self) {
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get timeout count
    pub fn timeout_count(&self) -> u64 {
        self.timeout_count.load(Ordering::Relaxed)
    }

    /// Increment timeout count
    pub fn inc_timeout_count(&self) {
        self.timeout_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempt_count: self.attempt_count(),
            delivered_count: self.delivered_count(),
            failure_count: self.failure_count(),
            timeout_count: self.timeout_count(),
        }
    }
}

/// Snapshot of channel metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub attempt_count: u64,
    pub delivered_count: u64,
    pub failure_count: u64,
    pub timeout_count: u64,
}
