//! FileChannel - appends notifications to a JSON-lines outbox

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::{
    CommentEvent, CommentNotifier, ContractError, DigestEvent, Notification, NotificationChannel,
    ViewEvent, ViewNotifier,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

use super::Payload;

/// Configuration for FileChannel
#[derive(Debug, Clone)]
pub struct FileChannelConfig {
    /// Outbox file, created with its parent directories
    pub path: PathBuf,
}

impl FileChannelConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./outbox/notifications.jsonl"));

        Self { path }
    }
}

/// One line of the outbox file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub channel: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub notification: Notification,
}

impl OutboxRecord {
    /// Parse every record of an outbox file
    pub async fn read_all(path: &Path) -> Result<Vec<Self>, ContractError> {
        let content = fs::read_to_string(path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| ContractError::Other(format!("invalid outbox line: {e}")))
            })
            .collect()
    }
}

#[derive(Serialize)]
struct OutboxLine<'a> {
    channel: &'a str,
    recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    payload: Payload<'a>,
}

/// Channel that writes notifications to an append-only outbox file
pub struct FileChannel {
    name: String,
    config: FileChannelConfig,
    file: Mutex<File>,
}

impl FileChannel {
    /// Create a new FileChannel
    pub async fn new(name: impl Into<String>, config: FileChannelConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)
            .await?;

        Ok(Self {
            name: name.into(),
            config,
            file: Mutex::new(file),
        })
    }

    /// Create from params map (for factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileChannelConfig::from_params(params);
        Self::new(name, config).await
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    async fn append(&self, payload: Payload<'_>) -> Result<(), ContractError> {
        let line = OutboxLine {
            channel: &self.name,
            recorded_at: Utc::now(),
            payload,
        };
        let mut data = serde_json::to_vec(&line)
            .map_err(|e| ContractError::channel_delivery(&self.name, e.to_string()))?;
        data.push(b'\n');

        let mut file = self.file.lock().await;
        let written = async {
            file.write_all(&data).await?;
            file.flush().await
        }
        .await;

        written.map_err(|e| {
            error!(channel = %self.name, kind = %payload.kind(), error = %e, "Outbox write failed");
            ContractError::channel_delivery(&self.name, e.to_string())
        })?;

        debug!(channel = %self.name, kind = %payload.kind(), bytes = data.len(), "Outbox appended");
        Ok(())
    }
}

impl NotificationChannel for FileChannel {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ViewNotifier for FileChannel {
    #[instrument(name = "file_channel_view", skip(self, event), fields(channel = %self.name))]
    async fn send_view_notification(&self, event: &ViewEvent) -> Result<(), ContractError> {
        self.append(Payload::VideoViewed(event)).await
    }

    #[instrument(name = "file_channel_digest", skip(self, digest), fields(channel = %self.name))]
    async fn send_digest_notification(&self, digest: &DigestEvent) -> Result<(), ContractError> {
        self.append(Payload::Digest(digest)).await
    }
}

#[async_trait]
impl CommentNotifier for FileChannel {
    #[instrument(name = "file_channel_comment", skip(self, event), fields(channel = %self.name))]
    async fn send_comment_notification(
        &self,
        event: &CommentEvent,
    ) -> Result<(), ContractError> {
        self.append(Payload::NewComment(event)).await
    }
}
