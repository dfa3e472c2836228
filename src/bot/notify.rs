use crate::leveling::XpChange;
use crate::utils::format::{format_level_down, format_level_up};
use poise::serenity_prelude as serenity;

pub fn mention(user_id: u64) -> String {
    serenity::Mention::User(serenity::UserId::new(user_id)).to_string()
}

/// Text for a level change, or `None` when the level did not move.
pub fn level_change_message(change: &XpChange) -> Option<String> {
    if change.leveled_up() {
        Some(format_level_up(&mention(change.user_id), change.progress.level))
    } else if change.leveled_down() {
        Some(format_level_down(&mention(change.user_id), change.progress.level))
    } else {
        None
    }
}

/// Posts the level change to `channel_id` without pinging anyone.
pub async fn announce_level_change(
    http: &serenity::Http,
    channel_id: serenity::ChannelId,
    change: &XpChange,
) -> Result<(), serenity::Error> {
    let Some(content) = level_change_message(change) else {
        return Ok(());
    };

    channel_id
        .send_message(
            http,
            serenity::CreateMessage::new()
                .content(content)
                .allowed_mentions(serenity::CreateAllowedMentions::new()),
        )
        .await?;

    Ok(())
}
