use poise::serenity_prelude as serenity;
use serde::Serialize;
use tracing::{info, warn};

use super::{parse_anchor, send_chunked};
use crate::channel::category_of;
use crate::gallery::{
    collect_image_message_ids, collect_image_urls, collect_image_urls_capped, ChannelHistory,
    MessageId,
};
use crate::state::Context;

/// Machine-readable result of `/gallery images json:true`.
#[derive(Debug, Serialize)]
struct ImageReport {
    channel: u64,
    category: Option<String>,
    count: usize,
    urls: Vec<String>,
}

/// Collect links to images posted in this channel
#[poise::command(slash_command, guild_only)]
pub async fn images(
    ctx: Context<'_>,
    #[description = "How many images to collect (default: all)"] amount: Option<u32>,
    #[description = "Only look at messages older than this message id or link"]
    before: Option<String>,
    #[description = "Reply with a JSON file instead of links"] json: Option<bool>,
) -> Result<(), anyhow::Error> {
    let anchor = match parse_anchor(before.as_deref()) {
        Ok(anchor) => anchor,
        Err(reason) => {
            warn!(user = ctx.author().name, reason, "rejected anchor");
            ctx.say(reason).await?;
            return Ok(());
        }
    };

    // History walks routinely outlive the 3s interaction window.
    ctx.defer().await?;

    let config = ctx.data().config.read().await.clone();
    let amount = amount.map(|a| config.effective_amount(a as usize));

    info!(
        user = ctx.author().name,
        channel = %ctx.channel_id(),
        ?amount,
        ?anchor,
        cache_size = config.cache_size,
        "image collection started"
    );

    let source = ChannelHistory::new(ctx.serenity_context().http.clone(), ctx.channel_id());
    let urls = match amount {
        Some(amount) => collect_image_urls_capped(&source, anchor, amount, config.cache_size).await?,
        None => collect_image_urls(&source, anchor, config.cache_size).await?,
    };

    info!(found = urls.len(), "image collection complete");

    let category = ctx
        .guild_channel()
        .await
        .and_then(|channel| category_of(ctx.serenity_context(), &channel))
        .map(|c| c.name);

    if json.unwrap_or(false) {
        let report = ImageReport {
            channel: ctx.channel_id().get(),
            category,
            count: urls.len(),
            urls,
        };
        let body = serde_json::to_vec_pretty(&report)?;
        ctx.send(
            poise::CreateReply::default()
                .content(format!("Found **{}** image(s).", report.count))
                .attachment(serenity::CreateAttachment::bytes(body, "images.json")),
        )
        .await?;
        return Ok(());
    }

    send_chunked(&ctx, &format_url_list(ctx.channel_id(), category.as_deref(), &urls)).await
}

/// List the messages in this channel that are image posts
#[poise::command(slash_command, guild_only)]
pub async fn image_ids(
    ctx: Context<'_>,
    #[description = "Only look at messages older than this message id or link"]
    before: Option<String>,
) -> Result<(), anyhow::Error> {
    let anchor = match parse_anchor(before.as_deref()) {
        Ok(anchor) => anchor,
        Err(reason) => {
            warn!(user = ctx.author().name, reason, "rejected anchor");
            ctx.say(reason).await?;
            return Ok(());
        }
    };
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    ctx.defer().await?;

    let cache_size = ctx.data().config.read().await.cache_size;
    let source = ChannelHistory::new(ctx.serenity_context().http.clone(), ctx.channel_id());
    let ids = collect_image_message_ids(&source, anchor, cache_size).await?;

    info!(
        user = ctx.author().name,
        channel = %ctx.channel_id(),
        found = ids.len(),
        "image message scan complete"
    );

    if ids.is_empty() {
        ctx.say("No image messages found.").await?;
        return Ok(());
    }

    let mut output = format!("**{}** image message(s):\n", ids.len());
    for id in ids {
        output.push_str(&format!(
            "- {}\n",
            message_link(guild_id.get(), ctx.channel_id().get(), id)
        ));
    }
    send_chunked(&ctx, &output).await
}

fn format_url_list(channel: serenity::ChannelId, category: Option<&str>, urls: &[String]) -> String {
    if urls.is_empty() {
        return format!("No images found in <#{}>.", channel);
    }

    let mut output = format!("Found **{}** image(s) in <#{}>", urls.len(), channel);
    if let Some(category) = category {
        output.push_str(&format!(" (category **{}**)", category));
    }
    output.push_str(":\n");
    for url in urls {
        // Angle brackets suppress Discord's embed previews.
        output.push_str(&format!("- <{}>\n", url));
    }
    output
}

fn message_link(guild: u64, channel: u64, message: MessageId) -> String {
    format!("https://discord.com/channels/{}/{}/{}", guild, channel, message)
}
