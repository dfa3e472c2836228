use crate::bot::checks;
use crate::bot::interactions::reset_buttons;
use crate::bot::{Context, Error};
use crate::utils::format::create_error_embed;

/// Reset all level data for this server
#[poise::command(slash_command, guild_only, check = "checks::is_admin")]
pub async fn resetlevels(ctx: Context<'_>) -> Result<(), Error> {
    let guild_name = ctx
        .guild()
        .map(|guild| guild.name.clone())
        .unwrap_or_else(|| "this server".to_string());

    let embed = create_error_embed(
        "⚠️ WARNING: Reset ALL Level Data?",
        &format!(
            "This will **permanently delete all level and XP data** for **{}**.\n\n\
             This action cannot be undone!",
            guild_name
        ),
    );

    let request = reset_buttons::ResetRequest::new(ctx.author().id.get(), chrono::Utc::now().timestamp());

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .components(reset_buttons::confirmation_buttons(&request)),
    )
    .await?;

    Ok(())
}
