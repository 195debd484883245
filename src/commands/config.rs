use tracing::info;

use crate::state::Context;

/// Configure history paging (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "cache_size | max_amount"] param: Option<String>,
    #[description = "New value"] value: Option<u32>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    if !ctx.data().is_admin(user_id) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    match (param.as_deref(), value) {
        // Show current config
        (None, _) => {
            let config = ctx.data().config.read().await.clone();
            ctx.say(format!(
                "**Gallery Configuration:**\n\
                 `cache_size`: {}\n\
                 `max_amount`: {}",
                config.cache_size, config.max_amount
            ))
            .await?;
        }
        // Set a parameter
        (Some(key), Some(val)) => {
            let reply = {
                let mut config = ctx.data().config.write().await;
                match key {
                    "cache_size" => {
                        let applied = config.set_cache_size(val as usize);
                        info!(user_id, applied, "cache_size updated");
                        format!("`cache_size` set to {}", applied)
                    }
                    "max_amount" => {
                        let applied = config.set_max_amount(val as usize);
                        info!(user_id, applied, "max_amount updated");
                        format!("`max_amount` set to {}", applied)
                    }
                    _ => format!(
                        "Unknown param `{}`. Valid: `cache_size`, `max_amount`",
                        key
                    ),
                }
            };
            ctx.say(reply).await?;
        }
        (Some(_), None) => {
            ctx.say("Provide both `param` and `value`. Example: `/gallery config cache_size 50`")
                .await?;
        }
    }

    Ok(())
}
