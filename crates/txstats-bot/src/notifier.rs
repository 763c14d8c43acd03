//! Report delivery to Discord text channels.
//!
//! Only the HTTP API is used; the bot never opens a gateway connection.

use async_trait::async_trait;
use futures::future::join_all;
use serenity::http::Http;
use serenity::model::id::ChannelId as DiscordChannelId;
use std::sync::Arc;
use tracing::{debug, info, warn};
use txstats_common::{split_message, ChannelId, Result};
use txstats_config::DiscordConfig;
use txstats_core::Notifier;

/// Discord's per-message character limit.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Posts messages to a fixed set of channels.
pub struct DiscordNotifier {
    http: Arc<Http>,
    channels: Vec<ChannelId>,
}

impl DiscordNotifier {
    /// Notifier authenticated with the configured bot token.
    pub fn new(config: &DiscordConfig) -> Self {
        Self {
            http: Arc::new(Http::new(&config.token)),
            channels: config.channels.clone(),
        }
    }

    /// Channels every message is posted to.
    pub fn channels(&self) -> &[ChannelId] {
        &self.channels
    }

    async fn post(&self, channel: ChannelId, chunks: &[String]) -> serenity::Result<()> {
        let target = DiscordChannelId::new(channel.0);
        for chunk in chunks {
            target.say(self.http.as_ref(), chunk).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    /// Posts to all channels concurrently. A channel that cannot be reached
    /// is logged and skipped.
    async fn send(&self, message: &str) -> Result<()> {
        let chunks = split_message(message, DISCORD_MESSAGE_LIMIT);
        debug!(
            channels = self.channels.len(),
            chunks = chunks.len(),
            "Posting report"
        );

        let chunks = &chunks;
        let results = join_all(
            self.channels
                .iter()
                .map(|channel| async move { (*channel, self.post(*channel, chunks).await) }),
        )
        .await;

        let delivered = results
            .into_iter()
            .filter(|(channel, result)| match result {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to post report to channel {}: {}", channel, e);
                    false
                }
            })
            .count();

        info!("Report posted to {}/{} channels", delivered, self.channels.len());
        Ok(())
    }
}
