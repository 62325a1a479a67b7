//! WebhookChannel - JSON POST to an HTTP endpoint

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::{
    CommentEvent, CommentNotifier, ContractError, DigestEvent, DigestTotals, NotificationChannel,
    ViewEvent, ViewNotifier,
};
use reqwest::{Client, Url};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use super::Payload;

/// Configuration for WebhookChannel
#[derive(Debug, Clone)]
pub struct WebhookChannelConfig {
    /// Target endpoint
    pub url: Url,
    /// Optional `Authorization: Bearer` token
    pub bearer_token: Option<String>,
}

impl WebhookChannelConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let url_str = params
            .get("url")
            .ok_or_else(|| "missing 'url' parameter".to_string())?;

        let url = Url::parse(url_str).map_err(|e| format!("invalid url '{}': {}", url_str, e))?;

        Ok(Self {
            url,
            bearer_token: params.get("bearer_token").cloned(),
        })
    }
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    channel: &'a str,
    sent_at: DateTime<Utc>,
    #[serde(flatten)]
    payload: Payload<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest_totals: Option<DigestTotals>,
}

/// Channel that posts notifications to a webhook
///
/// The request timeout is owned by the fan-out deadline, not the client.
pub struct WebhookChannel {
    name: String,
    config: WebhookChannelConfig,
    client: Client,
}

impl WebhookChannel {
    /// Create a new WebhookChannel
    pub fn new(name: impl Into<String>, config: WebhookChannelConfig) -> Result<Self, ContractError> {
        let name = name.into();
        let client = Client::builder()
            .user_agent(concat!("notify-fanout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ContractError::channel_delivery(&name, e.to_string()))?;

        debug!(channel = %name, target = %config.url, "WebhookChannel ready");

        Ok(Self {
            name,
            config,
            client,
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = WebhookChannelConfig::from_params(params)
            .map_err(|e| ContractError::config_validation(format!("channels[{name}].params"), e))?;
        Self::new(name, config)
    }

    async fn post(&self, payload: Payload<'_>) -> Result<(), ContractError> {
        let digest_totals = match payload {
            Payload::Digest(digest) => Some(digest.totals()),
            _ => None,
        };
        let body = WebhookBody {
            channel: &self.name,
            sent_at: Utc::now(),
            payload,
            digest_totals,
        };

        let mut request = self.client.post(self.config.url.clone()).json(&body);
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ContractError::channel_delivery(&self.name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                channel = %self.name,
                kind = %payload.kind(),
                status = status.as_u16(),
                "Webhook rejected notification"
            );
            return Err(ContractError::ChannelRejected {
                channel: self.name.clone(),
                status: status.as_u16(),
            });
        }

        debug!(channel = %self.name, kind = %payload.kind(), status = status.as_u16(), "Sent");
        Ok(())
    }
}

impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ViewNotifier for WebhookChannel {
    #[instrument(name = "webhook_channel_view", skip(self, event), fields(channel = %self.name))]
    async fn send_view_notification(&self, event: &ViewEvent) -> Result<(), ContractError> {
        self.post(Payload::VideoViewed(event)).await
    }

    #[instrument(name = "webhook_channel_digest", skip(self, digest), fields(channel = %self.name))]
    async fn send_digest_notification(&self, digest: &DigestEvent) -> Result<(), ContractError> {
        self.post(Payload::Digest(digest)).await
    }
}

#[async_trait]
impl CommentNotifier for WebhookChannel {
    #[instrument(name = "webhook_channel_comment", skip(self, event), fields(channel = %self.name))]
    async fn send_comment_notification(
        &self,
        event: &CommentEvent,
    ) -> Result<(), ContractError> {
        self.post(Payload::NewComment(event)).await
    }
}
