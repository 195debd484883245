use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use tracing::debug;

use super::types::{ChatMessage, MessageId};

/// Discord refuses history requests above this many messages.
pub const MAX_FETCH_LIMIT: usize = 100;

/// Backward-paged access to a channel's message history.
#[async_trait]
pub trait MessageSource: Send + Sync {
    type Error: Send;

    /// Up to `limit` messages strictly older than `anchor`, newest first.
    /// With no anchor, the newest `limit` messages of the channel.
    async fn fetch_before(
        &self,
        anchor: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, Self::Error>;
}

/// History of one Discord channel, read through the REST API.
pub struct ChannelHistory {
    http: Arc<serenity::Http>,
    channel: serenity::ChannelId,
}

impl ChannelHistory {
    pub fn new(http: Arc<serenity::Http>, channel: serenity::ChannelId) -> Self {
        Self { http, channel }
    }
}

#[async_trait]
impl MessageSource for ChannelHistory {
    type Error = serenity::Error;

    async fn fetch_before(
        &self,
        anchor: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, Self::Error> {
        let limit = limit.clamp(1, MAX_FETCH_LIMIT) as u8;
        let mut request = serenity::GetMessages::new().limit(limit);
        if let Some(id) = anchor {
            request = request.before(serenity::MessageId::new(id));
        }

        let messages = self.channel.messages(&*self.http, request).await?;
        debug!(channel = %self.channel, ?anchor, limit, fetched = messages.len(), "history page fetched");
        Ok(messages.iter().map(ChatMessage::from).collect())
    }
}
