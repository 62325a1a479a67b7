//! 通知分发指标收集模块
//!
//! 基于 DispatchReport 和 DeliveryObserver 回调收集通道投递指标。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use contracts::{ChannelFailure, DeliveryObserver, DeliveryStatus, DispatchReport, EventKind};
use metrics::{counter, histogram};

/// 记录单个通道投递结果
pub fn record_channel_delivery(channel: &str, kind: EventKind, status: DeliveryStatus) {
    counter!(
        "notify_fanout_channel_deliveries_total",
        "channel" => channel.to_string(),
        "kind" => kind.as_str(),
        "status" => status.as_str()
    )
    .increment(1);
}

/// 记录单个通道投递耗时
pub fn record_delivery_latency_ms(channel: &str, latency_ms: f64) {
    histogram!(
        "notify_fanout_delivery_latency_ms",
        "channel" => channel.to_string()
    )
    .record(latency_ms);
}

/// 从 DispatchReport 记录一次分发的汇总指标
///
/// 通道级计数由 [`MetricsObserver`] 负责，这里只记录分发维度。
///
/// # Example
///
/// ```ignore
/// let report = fanout.dispatch_view_report(&cancel, &event).await;
/// record_dispatch(&report);
/// ```
pub fn record_dispatch(report: &DispatchReport) {
    let kind = report.kind.as_str();
    counter!("notify_fanout_dispatches_total", "kind" => kind).increment(1);

    if report.cancelled {
        counter!("notify_fanout_dispatches_cancelled_total", "kind" => kind).increment(1);
    }
    if report.skipped > 0 {
        counter!("notify_fanout_channels_skipped_total", "kind" => kind)
            .increment(report.skipped as u64);
    }
    if report.all_failed() {
        counter!("notify_fanout_dispatches_all_failed_total", "kind" => kind).increment(1);
    }
}

/// 记录 Prometheus 指标后转发给内部 observer
pub struct MetricsObserver {
    inner: Arc<dyn DeliveryObserver>,
}

impl MetricsObserver {
    pub fn new(inner: Arc<dyn DeliveryObserver>) -> Self {
        Self { inner }
    }
}

impl DeliveryObserver for MetricsObserver {
    fn on_failure(&self, failure: &ChannelFailure<'_>) {
        let status = if failure.error.is_timeout() {
            DeliveryStatus::TimedOut
        } else {
            DeliveryStatus::Failed
        };
        record_channel_delivery(failure.channel, failure.kind, status);
        self.inner.on_failure(failure);
    }

    fn on_delivered(&self, channel: &str, kind: EventKind, elapsed: Duration) {
        record_channel_delivery(channel, kind, DeliveryStatus::Delivered);
        record_delivery_latency_ms(channel, elapsed.as_secs_f64() * 1000.0);
        self.inner.on_delivered(channel, kind, elapsed);
    }
}

/// 单个通道的累计投递次数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelCounts {
    pub delivered: u64,
    pub failed: u64,
    pub timed_out: u64,
}

/// 分发指标聚合器
///
/// 在内存中聚合 DispatchReport，便于 CLI 输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DeliveryStatsAggregator {
    /// 总分发次数
    pub total_dispatches: u64,

    /// 被取消的分发次数
    pub cancelled_dispatches: u64,

    /// 因取消而未尝试的通道数
    pub skipped_channels: u64,

    /// 所有通道均失败的分发次数
    pub all_failed_dispatches: u64,

    /// 各事件类型的分发次数
    pub dispatches_by_kind: BTreeMap<&'static str, u64>,

    /// 各通道投递次数
    pub channel_counts: BTreeMap<String, ChannelCounts>,

    /// 成功投递耗时统计 (毫秒)
    pub latency_stats: RunningStats,
}

impl DeliveryStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, report: &DispatchReport) {
        self.total_dispatches += 1;
        *self.dispatches_by_kind.entry(report.kind.as_str()).or_insert(0) += 1;
        self.skipped_channels += report.skipped as u64;

        if report.cancelled {
            self.cancelled_dispatches += 1;
        }
        if report.all_failed() {
            self.all_failed_dispatches += 1;
        }

        for outcome in &report.outcomes {
            let counts = self
                .channel_counts
                .entry(outcome.channel.clone())
                .or_default();
            match outcome.status {
                DeliveryStatus::Delivered => {
                    counts.delivered += 1;
                    self.latency_stats
                        .push(outcome.elapsed.as_secs_f64() * 1000.0);
                }
                DeliveryStatus::Failed => counts.failed += 1,
                DeliveryStatus::TimedOut => counts.timed_out += 1,
                DeliveryStatus::Cancelled => {}
            }
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let delivered: u64 = self.channel_counts.values().map(|c| c.delivered).sum();
        let attempted: u64 = self
            .channel_counts
            .values()
            .map(|c| c.delivered + c.failed + c.timed_out)
            .sum();

        MetricsSummary {
            total_dispatches: self.total_dispatches,
            cancelled_dispatches: self.cancelled_dispatches,
            all_failed_dispatches: self.all_failed_dispatches,
            skipped_channels: self.skipped_channels,
            delivered,
            failed: attempted - delivered,
            success_rate: if attempted > 0 {
                delivered as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            dispatches_by_kind: self.dispatches_by_kind.clone(),
            channel_counts: self.channel_counts.clone(),
            latency_ms: StatsSummary::from(&self.latency_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_dispatches: u64,
    pub cancelled_dispatches: u64,
    pub all_failed_dispatches: u64,
    pub skipped_channels: u64,
    pub delivered: u64,
    /// 含超时
    pub failed: u64,
    pub success_rate: f64,
    pub dispatches_by_kind: BTreeMap<&'static str, u64>,
    pub channel_counts: BTreeMap<String, ChannelCounts>,
    pub latency_ms: StatsSummary,
}

impl MetricsSummary {
    /// 是否存在失败、超时或取消
    pub fn has_problems(&self) -> bool {
        self.failed > 0 || self.cancelled_dispatches > 0 || self.skipped_channels > 0
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Dispatches: {}", self.total_dispatches)?;
        for (kind, count) in &self.dispatches_by_kind {
            writeln!(f, "  {}: {}", kind, count)?;
        }
        writeln!(
            f,
            "Deliveries: {} ok, {} failed ({:.2}% success)",
            self.delivered, self.failed, self.success_rate
        )?;
        if self.cancelled_dispatches > 0 {
            writeln!(
                f,
                "Cancelled dispatches: {} ({} channels skipped)",
                self.cancelled_dispatches, self.skipped_channels
            )?;
        }
        if self.all_failed_dispatches > 0 {
            writeln!(f, "Dispatches with no delivery: {}", self.all_failed_dispatches)?;
        }
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.channel_counts.is_empty() {
            writeln!(f, "Per channel:")?;
            for (channel, counts) in &self.channel_counts {
                writeln!(
                    f,
                    "  {}: delivered={}, failed={}, timed_out={}",
                    channel, counts.delivered, counts.failed, counts.timed_out
                )?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
