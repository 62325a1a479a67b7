//! FanoutBuilder - both fan-outs from a NotifyBlueprint

use std::sync::Arc;

use tracing::{info, instrument};

use contracts::{
    Capability, ChannelConfig, ChannelType, CommentNotifier, DeliveryObserver, NotifyBlueprint,
    ViewNotifier,
};

use crate::channels::{FileChannel, LogChannel, WebhookChannel};
use crate::comment::CommentNotificationFanout;
use crate::error::FanoutError;
use crate::handle::ChannelHandle;
use crate::view::ViewNotificationFanout;

/// The two fan-outs built from one blueprint
pub struct Fanouts {
    pub view: ViewNotificationFanout,
    pub comment: CommentNotificationFanout,
}

/// Builder for creating both fan-outs
pub struct FanoutBuilder {
    blueprint: NotifyBlueprint,
    observer: Option<Arc<dyn DeliveryObserver>>,
}

impl FanoutBuilder {
    /// Create a new FanoutBuilder
    pub fn new(blueprint: NotifyBlueprint) -> Self {
        Self {
            blueprint,
            observer: None,
        }
    }

    /// Observer shared by both fan-outs
    pub fn with_observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Instantiate every channel once and register it by capability
    ///
    /// Registration order is config order in both fan-outs.
    #[instrument(
        name = "fanout_builder_build",
        skip(self),
        fields(channel_count = self.blueprint.channels.len())
    )]
    pub async fn build(self) -> Result<Fanouts, FanoutError> {
        let mut view_handles = Vec::new();
        let mut comment_handles = Vec::new();

        for config in &self.blueprint.channels {
            let channel = create_channel(config).await?;
            let timeout = self.blueprint.timeout_for(config);

            if config.capabilities.contains(&Capability::View) {
                view_handles.push(ChannelHandle::new(channel.as_view()).with_timeout(timeout));
            }
            if config.capabilities.contains(&Capability::Comment) {
                comment_handles
                    .push(ChannelHandle::new(channel.as_comment()).with_timeout(timeout));
            }
        }

        info!(
            view_channels = view_handles.len(),
            comment_channels = comment_handles.len(),
            "Fan-outs built"
        );

        let mut view = ViewNotificationFanout::new(view_handles);
        let mut comment = CommentNotificationFanout::new(comment_handles);
        if let Some(observer) = self.observer {
            view = view.with_observer(Arc::clone(&observer));
            comment = comment.with_observer(observer);
        }

        Ok(Fanouts { view, comment })
    }
}

/// Concrete channel, shared by both fan-outs
enum BuiltChannel {
    Log(Arc<LogChannel>),
    File(Arc<FileChannel>),
    Webhook(Arc<WebhookChannel>),
}

impl BuiltChannel {
    fn as_view(&self) -> Arc<dyn ViewNotifier> {
        match self {
            Self::Log(c) => c.clone(),
            Self::File(c) => c.clone(),
            Self::Webhook(c) => c.clone(),
        }
    }

    fn as_comment(&self) -> Arc<dyn CommentNotifier> {
        match self {
            Self::Log(c) => c.clone(),
            Self::File(c) => c.clone(),
            Self::Webhook(c) => c.clone(),
        }
    }
}

/// Create a channel from configuration
#[instrument(
    name = "fanout_create_channel",
    skip(config),
    fields(channel = %config.name, channel_type = ?config.channel_type)
)]
async fn create_channel(config: &ChannelConfig) -> Result<BuiltChannel, FanoutError> {
    match config.channel_type {
        ChannelType::Log => Ok(BuiltChannel::Log(Arc::new(LogChannel::new(&config.name)))),
        ChannelType::File => {
            let channel = FileChannel::from_params(&config.name, &config.params)
                .await
                .map_err(|e| FanoutError::channel_creation(&config.name, e.to_string()))?;
            Ok(BuiltChannel::File(Arc::new(channel)))
        }
        ChannelType::Webhook => {
            let channel = WebhookChannel::from_params(&config.name, &config.params)
                .map_err(|e| FanoutError::channel_creation(&config.name, e.to_string()))?;
            Ok(BuiltChannel::Webhook(Arc::new(channel)))
        }
    }
}

/// Convenience function to build both fan-outs from a blueprint
#[instrument(name = "fanout_create", skip(blueprint))]
pub async fn create_fanouts(blueprint: NotifyBlueprint) -> Result<Fanouts, FanoutError> {
    FanoutBuilder::new(blueprint).build().await
}
