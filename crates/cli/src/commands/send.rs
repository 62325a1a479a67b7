//! `send` command implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{DispatchReport, Notification};
use fanout::{CancellationToken, FanoutBuilder, Fanouts, TracingObserver};
use observability::{record_dispatch, DeliveryStatsAggregator, MetricsObserver};
use tracing::{info, warn};

use crate::cli::SendArgs;
use crate::events::{load_events, validate_events, LoadedEvent};

/// Statistics from one `send` run
#[derive(Debug, Default)]
struct SendStats {
    events_loaded: usize,
    events_rejected: usize,
    events_dispatched: usize,
    /// Never dispatched because of Ctrl+C
    events_not_sent: usize,
    duration: Duration,
    deliveries: DeliveryStatsAggregator,
}

/// Execute the `send` command
pub async fn run_send(args: &SendArgs) -> Result<()> {
    info!(config = %args.config.display(), events = %args.events.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let loaded = load_events(&args.events)
        .with_context(|| format!("Failed to load events from {}", args.events.display()))?;
    let events_loaded = loaded.len();
    let (events, events_rejected) = validate_events(loaded, args.strict)?;

    let observer = Arc::new(MetricsObserver::new(Arc::new(TracingObserver)));
    let fanouts = FanoutBuilder::new(blueprint)
        .with_observer(observer)
        .build()
        .await
        .context("Failed to build channels")?;

    info!(
        view_channels = fanouts.view.len(),
        comment_channels = fanouts.comment.len(),
        events = events.len(),
        "Starting delivery"
    );

    let cancel = CancellationToken::new();
    let signal_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            warn!("Received shutdown signal, cancelling delivery...");
            cancel.cancel();
        }
    });

    let mut stats = SendStats {
        events_loaded,
        events_rejected,
        ..Default::default()
    };
    let started = Instant::now();
    deliver_all(&fanouts, &events, &cancel, args.json, &mut stats).await?;
    stats.duration = started.elapsed();
    signal_task.abort();

    print_summary(&stats);

    for (name, snapshot) in fanouts.view.metrics() {
        info!(channel = %name, kind = "view", ?snapshot, "Channel metrics");
    }
    for (name, snapshot) in fanouts.comment.metrics() {
        info!(channel = %name, kind = "comment", ?snapshot, "Channel metrics");
    }

    if stats.events_not_sent > 0 {
        warn!(not_sent = stats.events_not_sent, "Delivery interrupted");
    }
    info!("Notify Fanout finished");
    Ok(())
}

/// Dispatch events in file order until done or cancelled
async fn deliver_all(
    fanouts: &Fanouts,
    events: &[LoadedEvent],
    cancel: &CancellationToken,
    json: bool,
    stats: &mut SendStats,
) -> Result<()> {
    for (i, event) in events.iter().enumerate() {
        if cancel.is_cancelled() {
            stats.events_not_sent = events.len() - i;
            break;
        }

        let report = dispatch(fanouts, cancel, &event.notification).await;
        record_dispatch(&report);
        stats.deliveries.update(&report);
        stats.events_dispatched += 1;

        if json {
            let line = serde_json::to_string(&report).context("Failed to serialize report")?;
            println!("{}", line);
        }

        if report.cancelled {
            stats.events_not_sent = events.len() - i - 1;
            break;
        }
    }
    Ok(())
}

async fn dispatch(
    fanouts: &Fanouts,
    cancel: &CancellationToken,
    notification: &Notification,
) -> DispatchReport {
    match notification {
        Notification::VideoViewed(event) => fanouts.view.dispatch_view_report(cancel, event).await,
        Notification::Digest(digest) => fanouts.view.dispatch_digest_report(cancel, digest).await,
        Notification::NewComment(event) => {
            fanouts.comment.dispatch_comment_report(cancel, event).await
        }
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn print_summary(stats: &SendStats) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Delivery Statistics                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📊 Events");
    println!("   ├─ Duration: {:.2}s", stats.duration.as_secs_f64());
    println!("   ├─ Loaded: {}", stats.events_loaded);
    println!("   ├─ Rejected (invalid): {}", stats.events_rejected);
    println!("   ├─ Dispatched: {}", stats.events_dispatched);
    println!("   └─ Not sent (cancelled): {}", stats.events_not_sent);

    println!("\n{}", stats.deliveries.summary());
}
