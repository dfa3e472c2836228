use crate::config::LevelingConfig;
use crate::leveling::error::LevelingResult;
use crate::leveling::ledger::{Ledger, XpChange};
use crate::leveling::voice::scaled_gain;

/// The parts of a chat message that matter for accrual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageActivity {
    pub author_id: u64,
    pub author_is_bot: bool,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
}

/// Grants XP for one message. `Ok(None)` when the message does not qualify.
///
/// Every qualifying message counts; there is no per-member cooldown.
pub async fn award_message_xp(
    ledger: &Ledger,
    config: &LevelingConfig,
    activity: &MessageActivity,
) -> LevelingResult<Option<XpChange>> {
    if activity.author_is_bot {
        return Ok(None);
    }
    let Some(guild_id) = activity.guild_id else {
        return Ok(None);
    };

    let multiplier = ledger.get_multiplier(guild_id).await?;
    let mut gain = scaled_gain(config.base_message_xp, multiplier);
    if gain <= 0 {
        return Ok(None);
    }
    if config.is_bonus_channel(activity.channel_id) {
        gain = gain.saturating_mul(2);
    }

    let change = ledger.add_xp(activity.author_id, guild_id, gain).await?;
    Ok(Some(change))
}
