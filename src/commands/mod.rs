mod config;
mod images;

use crate::gallery::MessageId;
use crate::state::Context;

/// Discord rejects messages above 2000 chars; keep some headroom.
const CHUNK_LIMIT: usize = 1990;

/// Gallery - find images posted in a channel
#[poise::command(
    slash_command,
    subcommands("images::images", "images::image_ids", "config::config")
)]
pub async fn gallery(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Parse the optional `before` argument into a message id anchor.
fn parse_anchor(before: Option<&str>) -> Result<Option<MessageId>, String> {
    let Some(raw) = before.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    // Accept a pasted message link as well as a bare id.
    let id = raw.rsplit('/').next().unwrap_or(raw);
    match id.parse::<MessageId>() {
        Ok(0) | Err(_) => Err(format!("`{}` is not a message id.", raw)),
        Ok(id) => Ok(Some(id)),
    }
}

/// Split text into Discord-safe chunks, preferring line then word boundaries.
fn split_chunks(text: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(limit);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}

/// Send a reply in chunks. Follow-ups go through the interaction webhook,
/// so no Send Messages channel permission is needed.
async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_chunks(text, CHUNK_LIMIT) {
        ctx.say(chunk).await?;
    }
    Ok(())
}
