use crate::bot::commands::{reply_ephemeral, require_guild};
use crate::bot::{Context, Error};
use crate::utils::format::{create_leaderboard_embed, create_rank_embed, leaderboard_fallback_name};
use crate::utils::validation::clamp_leaderboard_count;
use poise::serenity_prelude as serenity;

/// Discord answered 404, i.e. the member left the guild.
fn is_not_found(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

async fn member_name(ctx: Context<'_>, guild_id: serenity::GuildId, user: &serenity::User) -> String {
    match guild_id.member(ctx.serenity_context(), user.id).await {
        Ok(member) => member.display_name().to_string(),
        Err(_) => user.display_name().to_string(),
    }
}

/// Check your rank or someone else's rank
#[poise::command(slash_command, guild_only)]
pub async fn rank(
    ctx: Context<'_>,
    #[description = "The user whose rank you want to check"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let guild_id = require_guild(&ctx)?;
    let target = user.as_ref().unwrap_or_else(|| ctx.author());

    let progress = ctx
        .data()
        .ledger
        .get_user_progress(target.id.get(), guild_id)
        .await?;

    let name = member_name(ctx, serenity::GuildId::new(guild_id), target).await;
    let embed = create_rank_embed(&name, target.avatar_url(), &progress);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Show the top users by XP
#[poise::command(slash_command, guild_only)]
pub async fn top(
    ctx: Context<'_>,
    #[description = "Number of users to show (max 25)"] count: Option<i64>,
) -> Result<(), Error> {
    let guild_id = require_guild(&ctx)?;
    let count = clamp_leaderboard_count(count);

    let entries = ctx.data().ledger.leaderboard(guild_id, count).await?;
    if entries.is_empty() {
        return reply_ephemeral(ctx, "No ranking data found for this server.".to_string()).await;
    }

    // Leaderboards can take a while when members are not cached.
    ctx.defer().await?;

    let guild_name = ctx
        .guild()
        .map(|guild| guild.name.clone())
        .unwrap_or_else(|| "this server".to_string());

    let guild = serenity::GuildId::new(guild_id);
    let mut rows = Vec::with_capacity(entries.len());
    for entry in &entries {
        let user_id = serenity::UserId::new(entry.user_id);
        let name = match guild.member(ctx.serenity_context(), user_id).await {
            Ok(member) => member.display_name().to_string(),
            Err(e) => {
                let missing = is_not_found(&e);
                if !missing {
                    tracing::warn!(user_id = entry.user_id, "Failed to fetch leaderboard member: {}", e);
                }
                leaderboard_fallback_name(entry.user_id, missing)
            }
        };
        rows.push((name, entry.level, entry.xp));
    }

    let embed = create_leaderboard_embed(&guild_name, &rows);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
