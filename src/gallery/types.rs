use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};

/// Discord snowflake of a message.
pub type MessageId = u64;

/// A file attached to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    /// Resource locator of the uploaded content (CDN URL on Discord).
    pub url: String,
}

/// The parts of a chat message the gallery reads. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl From<&serenity::Attachment> for Attachment {
    fn from(a: &serenity::Attachment) -> Self {
        Self {
            filename: a.filename.clone(),
            url: a.url.clone(),
        }
    }
}

impl From<&serenity::Message> for ChatMessage {
    fn from(m: &serenity::Message) -> Self {
        Self {
            id: m.id.get(),
            content: m.content.clone(),
            attachments: m.attachments.iter().map(Attachment::from).collect(),
        }
    }
}
