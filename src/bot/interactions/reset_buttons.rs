//! Confirm/Cancel buttons for `/resetlevels`.
//!
//! The admin's id and the time the prompt was issued travel in the button
//! custom id, e.g. `reset_levels:confirm:1234:1700000000`.

use crate::bot::{Data, Error};
use crate::utils::format::{create_error_embed, create_info_embed, create_success_embed};
use poise::serenity_prelude as serenity;

const RESET_PREFIX: &str = "reset_levels";

/// Seconds the confirmation stays usable.
pub const CONFIRMATION_TIMEOUT_SECS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetAction {
    Confirm,
    Cancel,
}

impl ResetAction {
    fn as_str(&self) -> &'static str {
        match self {
            ResetAction::Confirm => "confirm",
            ResetAction::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetRequest {
    pub admin_id: u64,
    pub issued_at: i64,
}

impl ResetRequest {
    pub fn new(admin_id: u64, issued_at: i64) -> Self {
        Self { admin_id, issued_at }
    }

    pub fn custom_id(&self, action: ResetAction) -> String {
        format!(
            "{}:{}:{}:{}",
            RESET_PREFIX,
            action.as_str(),
            self.admin_id,
            self.issued_at
        )
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now - self.issued_at > CONFIRMATION_TIMEOUT_SECS
    }
}

pub fn is_reset_interaction(custom_id: &str) -> bool {
    custom_id.starts_with(RESET_PREFIX)
}

pub fn parse_custom_id(custom_id: &str) -> Option<(ResetAction, ResetRequest)> {
    let mut parts = custom_id.split(':');
    if parts.next()? != RESET_PREFIX {
        return None;
    }

    let action = match parts.next()? {
        "confirm" => ResetAction::Confirm,
        "cancel" => ResetAction::Cancel,
        _ => return None,
    };
    let admin_id = parts.next()?.parse().ok()?;
    let issued_at = parts.next()?.parse().ok()?;

    if parts.next().is_some() {
        return None;
    }
    Some((action, ResetRequest::new(admin_id, issued_at)))
}

pub fn confirmation_buttons(request: &ResetRequest) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(request.custom_id(ResetAction::Confirm))
            .label("Reset All Data")
            .style(serenity::ButtonStyle::Danger),
        serenity::CreateButton::new(request.custom_id(ResetAction::Cancel))
            .label("Cancel")
            .style(serenity::ButtonStyle::Secondary),
    ])]
}

async fn reply_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

// Replaces the prompt with `embed` and removes the buttons.
async fn close_prompt(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    embed: serenity::CreateEmbed,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

pub async fn handle_reset_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some((action, request)) = parse_custom_id(&interaction.data.custom_id) else {
        return reply_ephemeral(ctx, interaction, "This button is no longer valid.").await;
    };

    if interaction.user.id.get() != request.admin_id {
        return reply_ephemeral(
            ctx,
            interaction,
            "Only the administrator who started this reset can use these buttons.",
        )
        .await;
    }

    if request.is_expired(chrono::Utc::now().timestamp()) {
        let embed = create_info_embed(
            "⏰ Timeout",
            "Reset operation cancelled due to timeout.",
        );
        return close_prompt(ctx, interaction, embed).await;
    }

    match action {
        ResetAction::Cancel => {
            let embed = create_info_embed("❌ Operation Cancelled", "No data was deleted.");
            close_prompt(ctx, interaction, embed).await
        }
        ResetAction::Confirm => {
            let Some(guild_id) = interaction.guild_id else {
                return reply_ephemeral(ctx, interaction, "This can only be used in a server.").await;
            };

            let embed = match data.ledger.reset_guild(guild_id.get()).await {
                Ok(deleted) => create_success_embed(
                    "✅ Level Data Deleted",
                    &format!(
                        "All level data for {} users in this server has been deleted.",
                        deleted
                    ),
                ),
                Err(e) => {
                    tracing::error!(guild_id = guild_id.get(), "Guild reset failed: {}", e);
                    create_error_embed(
                        "❌ Error",
                        &format!("An error occurred during deletion: {}", e),
                    )
                }
            };
            close_prompt(ctx, interaction, embed).await
        }
    }
}
