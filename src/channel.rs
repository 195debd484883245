use poise::serenity_prelude as serenity;

/// Category a guild channel is filed under, looked up in the gateway cache.
///
/// `None` for channels without a parent, parents missing from the cache,
/// and threads (whose parent is a text channel, not a category).
pub fn category_of(
    ctx: &serenity::Context,
    channel: &serenity::GuildChannel,
) -> Option<serenity::GuildChannel> {
    let parent = channel.parent_id?;
    let guild = ctx.cache.guild(channel.guild_id)?;
    guild
        .channels
        .get(&parent)
        .filter(|c| c.kind == serenity::ChannelType::Category)
        .cloned()
}
