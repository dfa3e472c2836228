use crate::bot::checks;
use crate::bot::commands::require_guild;
use crate::bot::notify::{level_change_message, mention};
use crate::bot::{Context, Error};
use crate::leveling::XpChange;
use crate::utils::format::{format_multiplier_duration, format_number, format_success_message};
use poise::serenity_prelude as serenity;

fn quiet_reply(content: String) -> poise::CreateReply {
    poise::CreateReply::default()
        .content(content)
        .allowed_mentions(serenity::CreateAllowedMentions::new())
}

async fn follow_up_level_change(ctx: Context<'_>, change: &XpChange) -> Result<(), Error> {
    if let Some(content) = level_change_message(change) {
        ctx.send(quiet_reply(content)).await?;
    }
    Ok(())
}

/// Add XP to a user
#[poise::command(slash_command, guild_only, check = "checks::is_moderator")]
pub async fn addxp(
    ctx: Context<'_>,
    #[description = "The user to add XP to"] user: serenity::User,
    #[description = "Amount of XP to add"] amount: i64,
) -> Result<(), Error> {
    let guild_id = require_guild(&ctx)?;
    let change = ctx.data().ledger.add_xp(user.id.get(), guild_id, amount).await?;

    tracing::info!(
        moderator_id = ctx.author().id.get(),
        user_id = change.user_id,
        guild_id,
        amount,
        "XP added by moderator"
    );

    ctx.send(quiet_reply(format_success_message(&format!(
        "Added **{}** XP to {}.",
        format_number(amount),
        mention(change.user_id)
    ))))
    .await?;

    if change.leveled_up() {
        follow_up_level_change(ctx, &change).await?;
    }
    Ok(())
}

/// Remove XP from a user
#[poise::command(slash_command, guild_only, check = "checks::is_moderator")]
pub async fn removexp(
    ctx: Context<'_>,
    #[description = "The user to remove XP from"] user: serenity::User,
    #[description = "Amount of XP to remove"] amount: i64,
) -> Result<(), Error> {
    let guild_id = require_guild(&ctx)?;
    let change = ctx.data().ledger.remove_xp(user.id.get(), guild_id, amount).await?;

    tracing::info!(
        moderator_id = ctx.author().id.get(),
        user_id = change.user_id,
        guild_id,
        amount,
        "XP removed by moderator"
    );

    ctx.send(quiet_reply(format_success_message(&format!(
        "Removed **{}** XP from {}.",
        format_number(amount),
        mention(change.user_id)
    ))))
    .await?;

    if change.leveled_down() {
        follow_up_level_change(ctx, &change).await?;
    }
    Ok(())
}

/// Set the XP multiplier for this server
#[poise::command(slash_command, guild_only, check = "checks::is_moderator")]
pub async fn setmultiplier(
    ctx: Context<'_>,
    #[description = "Multiplier value (0.1 or greater)"] value: f64,
    #[description = "Duration in minutes (0 for permanent)"] minutes: Option<i64>,
) -> Result<(), Error> {
    let guild_id = require_guild(&ctx)?;
    let minutes = minutes.unwrap_or(0);

    let setting = ctx.data().ledger.set_multiplier(guild_id, value, minutes).await?;

    ctx.say(format_success_message(&format!(
        "Set XP multiplier to **{}x** {}.",
        setting.multiplier,
        format_multiplier_duration(&setting, minutes)
    )))
    .await?;

    Ok(())
}
