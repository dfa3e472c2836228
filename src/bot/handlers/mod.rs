use crate::bot::interactions::reset_buttons;
use crate::bot::notify;
use crate::bot::{Data, Error};
use crate::leveling::message::{MessageActivity, award_message_xp};
use crate::utils::format::format_error_message;
use poise::serenity_prelude as serenity;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!("Bot logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::Message { new_message } => {
            handle_message(ctx, new_message, data).await;
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component_interaction),
        } => {
            if reset_buttons::is_reset_interaction(&component_interaction.data.custom_id) {
                if let Err(e) =
                    reset_buttons::handle_reset_interaction(ctx, component_interaction, data).await
                {
                    tracing::error!("Error handling reset interaction: {:?}", e);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

// Accrual failures are logged only; the author never sees them.
async fn handle_message(ctx: &serenity::Context, message: &serenity::Message, data: &Data) {
    let activity = MessageActivity {
        author_id: message.author.id.get(),
        author_is_bot: message.author.bot,
        guild_id: message.guild_id.map(|id| id.get()),
        channel_id: message.channel_id.get(),
    };

    match award_message_xp(&data.ledger, &data.config.leveling, &activity).await {
        Ok(Some(change)) if change.leveled_up() => {
            if let Err(e) =
                notify::announce_level_change(&ctx.http, message.channel_id, &change).await
            {
                tracing::warn!(user_id = change.user_id, "Failed to announce level up: {}", e);
            }
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(
                user_id = activity.author_id,
                guild_id = ?activity.guild_id,
                "Failed to award message XP: {}",
                e
            );
        }
    }
}

pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                "Command error: {}",
                error
            );
            let reply = poise::CreateReply::default()
                .content(format_error_message(&error.to_string()))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::error!("Failed to send error reply: {}", e);
            }
        }
        // The check already told the user why.
        poise::FrameworkError::CommandCheckFailed { error: None, .. } => {}
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}
