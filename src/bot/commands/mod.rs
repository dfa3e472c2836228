pub mod moderation;
pub mod rank;
pub mod reset;

use crate::bot::{Context, Error};

/// Guild of the invoking interaction; commands using this are `guild_only`.
pub(crate) fn require_guild(ctx: &Context<'_>) -> Result<u64, Error> {
    ctx.guild_id()
        .map(|id| id.get())
        .ok_or_else(|| "This command can only be used in a server.".into())
}

pub(crate) async fn reply_ephemeral(ctx: Context<'_>, content: String) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}
