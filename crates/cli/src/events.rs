//! Event file loading.
//!
//! Two layouts are accepted: one `Notification` per line (JSON lines), or a
//! single JSON array when the file extension is `.json`. Blank lines and
//! lines starting with `#` are skipped in the line format.

use std::path::Path;

use contracts::Notification;
use tracing::{debug, warn};

use crate::error::{CliError, Result};

/// A parsed event and where it came from
#[derive(Debug, Clone)]
pub struct LoadedEvent {
    /// 1-based line (JSON lines) or element number (JSON array)
    pub position: usize,
    pub notification: Notification,
}

/// Read and parse an event file
pub fn load_events(path: &Path) -> Result<Vec<LoadedEvent>> {
    let content = std::fs::read_to_string(path)?;
    let is_array = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let events = if is_array {
        parse_array(&content)?
    } else {
        parse_lines(&content)?
    };

    debug!(path = %path.display(), count = events.len(), "Events loaded");
    Ok(events)
}

fn parse_array(content: &str) -> Result<Vec<LoadedEvent>> {
    let notifications: Vec<Notification> =
        serde_json::from_str(content).map_err(|e| CliError::event_parse(e.line(), e.to_string()))?;

    Ok(notifications
        .into_iter()
        .enumerate()
        .map(|(i, notification)| LoadedEvent {
            position: i + 1,
            notification,
        })
        .collect())
}

fn parse_lines(content: &str) -> Result<Vec<LoadedEvent>> {
    let mut events = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let notification = serde_json::from_str(line)
            .map_err(|e| CliError::event_parse(i + 1, e.to_string()))?;
        events.push(LoadedEvent {
            position: i + 1,
            notification,
        });
    }
    Ok(events)
}

/// Drop events whose fields fail validation
///
/// In strict mode the first invalid event aborts instead.
pub fn validate_events(events: Vec<LoadedEvent>, strict: bool) -> Result<(Vec<LoadedEvent>, usize)> {
    let mut valid = Vec::with_capacity(events.len());
    let mut rejected = 0;

    for event in events {
        match event.notification.validate() {
            Ok(()) => valid.push(event),
            Err(errors) => {
                let err = CliError::event_validation(event.position, errors.to_string());
                if strict {
                    return Err(err);
                }
                warn!(
                    position = event.position,
                    kind = %event.notification.kind(),
                    error = %err,
                    "Skipping invalid event"
                );
                rejected += 1;
            }
        }
    }

    Ok((valid, rejected))
}
