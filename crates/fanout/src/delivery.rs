//! Shared delivery loop behind both fan-outs
//!
//! Sequential, registration order, every channel attempted unless the
//! dispatch is cancelled. Channel errors end up in the report and the
//! observer, never in the return value.

use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use contracts::{
    ChannelFailure, ChannelOutcome, ContractError, DeliveryObserver, DeliveryStatus,
    DispatchReport, EventKind, NotificationChannel,
};

use crate::error::FanoutError;
use crate::handle::ChannelHandle;

pub(crate) type DeliveryFuture<'a> = BoxFuture<'a, Result<(), ContractError>>;

/// Attempt every handle once, in order
pub(crate) async fn deliver_each<'a, N, F>(
    handles: &'a [ChannelHandle<N>],
    kind: EventKind,
    cancel: &CancellationToken,
    observer: &dyn DeliveryObserver,
    mut send: F,
) -> DispatchReport
where
    N: NotificationChannel + ?Sized + 'a,
    F: FnMut(&'a N) -> DeliveryFuture<'a>,
{
    let mut report = DispatchReport::new(kind);

    for (index, handle) in handles.iter().enumerate() {
        if cancel.is_cancelled() {
            mark_cancelled(&mut report, handles.len() - index);
            break;
        }

        let outcome = attempt(handle, kind, cancel, observer, send(handle.notifier())).await;
        let abandoned = outcome.status == DeliveryStatus::Cancelled;
        report.outcomes.push(outcome);

        if abandoned {
            mark_cancelled(&mut report, handles.len() - index - 1);
            break;
        }
    }

    if !handles.is_empty() {
        debug!(
            kind = %kind,
            delivered = report.delivered(),
            failed = report.failed(),
            skipped = report.skipped,
            "Dispatch finished"
        );
    }

    report
}

/// Map a report onto the caller-facing contract: only cancellation is an error
pub(crate) fn into_result(report: &DispatchReport) -> Result<(), FanoutError> {
    if report.cancelled {
        Err(FanoutError::Cancelled {
            kind: report.kind,
            skipped: report.skipped,
        })
    } else {
        Ok(())
    }
}

fn mark_cancelled(report: &mut DispatchReport, skipped: usize) {
    report.cancelled = true;
    report.skipped = skipped;
    debug!(kind = %report.kind, skipped, "Dispatch cancelled");
}

async fn attempt<N: NotificationChannel + ?Sized>(
    handle: &ChannelHandle<N>,
    kind: EventKind,
    cancel: &CancellationToken,
    observer: &dyn DeliveryObserver,
    delivery: DeliveryFuture<'_>,
) -> ChannelOutcome {
    let metrics = handle.metrics();
    metrics.inc_attempt_count();
    let started = Instant::now();

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = with_deadline(handle.name(), handle.timeout(), delivery) => Some(result),
    };
    let elapsed = started.elapsed();

    let (status, error) = match result {
        None => {
            debug!(channel = %handle.name(), kind = %kind, "Delivery abandoned on cancel");
            (DeliveryStatus::Cancelled, None)
        }
        Some(Ok(())) => {
            metrics.inc_delivered_count();
            observer.on_delivered(handle.name(), kind, elapsed);
            (DeliveryStatus::Delivered, None)
        }
        Some(Err(error)) => {
            let status = if error.is_timeout() {
                metrics.inc_timeout_count();
                DeliveryStatus::TimedOut
            } else {
                metrics.inc_failure_count();
                DeliveryStatus::Failed
            };
            observer.on_failure(&ChannelFailure {
                channel: handle.name(),
                kind,
                error: &error,
            });
            (status, Some(error.to_string()))
        }
    };

    ChannelOutcome {
        channel: handle.name().to_string(),
        status,
        error,
        elapsed,
    }
}

async fn with_deadline(
    channel: &str,
    timeout: Option<Duration>,
    delivery: DeliveryFuture<'_>,
) -> Result<(), ContractError> {
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, delivery).await {
            Ok(result) => result,
            Err(_) => Err(ContractError::channel_timeout(
                channel,
                u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            )),
        },
        None => delivery.await,
    }
}
