//! Drives voice accrual from the gateway cache on a fixed interval.

use crate::bot::notify;
use crate::config::LevelingConfig;
use crate::leveling::Ledger;
use crate::leveling::voice::{self, GuildVoiceSnapshot, VoiceChannelSnapshot, VoiceMember};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

pub struct VoiceTask {
    pub cache: Arc<serenity::Cache>,
    pub http: Arc<serenity::Http>,
    pub ledger: Arc<Ledger>,
    pub config: LevelingConfig,
    pub level_up_channel_id: Option<u64>,
}

/// Copies voice presence out of the cache so no cache guard is held across awaits.
pub fn snapshot_voice_channels(cache: &serenity::Cache) -> Vec<GuildVoiceSnapshot> {
    cache
        .guilds()
        .into_iter()
        .filter_map(|guild_id| cache.guild(guild_id).map(|guild| snapshot_guild(&guild)))
        .collect()
}

fn snapshot_guild(guild: &serenity::Guild) -> GuildVoiceSnapshot {
    let afk_channel_id = guild.afk_metadata.as_ref().map(|afk| afk.afk_channel_id);
    let mut channels: HashMap<serenity::ChannelId, Vec<VoiceMember>> = HashMap::new();

    for (user_id, state) in &guild.voice_states {
        let Some(channel_id) = state.channel_id else {
            continue;
        };
        let is_voice_channel = guild
            .channels
            .get(&channel_id)
            .is_some_and(|channel| channel.kind == serenity::ChannelType::Voice);
        if !is_voice_channel {
            continue;
        }

        let is_bot = state
            .member
            .as_ref()
            .or_else(|| guild.members.get(user_id))
            .is_some_and(|member| member.user.bot);

        channels.entry(channel_id).or_default().push(VoiceMember {
            user_id: user_id.get(),
            is_bot,
            is_afk: afk_channel_id == Some(channel_id),
        });
    }

    GuildVoiceSnapshot {
        guild_id: guild.id.get(),
        channels: channels
            .into_iter()
            .map(|(channel_id, members)| VoiceChannelSnapshot {
                channel_id: channel_id.get(),
                members,
            })
            .collect(),
    }
}

/// Runs until `shutdown` flips to true. Ticks run inline in this task, so a
/// slow tick delays (and with `Skip`, drops) the next one instead of overlapping it.
pub async fn run_voice_loop(task: VoiceTask, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(task.config.voice_tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick fires immediately; presence is rewarded after a full interval.
    ticker.tick().await;

    tracing::info!(
        interval_secs = task.config.voice_tick_interval.as_secs(),
        "Voice XP task started"
    );

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!("Voice XP task shutting down");
                    break;
                }
            }
            _ = ticker.tick() => {
                run_tick(&task).await;
            }
        }
    }
}

async fn run_tick(task: &VoiceTask) {
    let guilds = snapshot_voice_channels(&task.cache);
    let report = voice::run_voice_tick(&task.ledger, &task.config, &guilds).await;

    tracing::debug!(
        guilds = guilds.len(),
        awarded = report.awarded,
        failed = report.failed,
        level_ups = report.level_ups.len(),
        "Voice XP tick finished"
    );

    let Some(channel_id) = task.level_up_channel_id else {
        return;
    };
    let channel_id = serenity::ChannelId::new(channel_id);
    for change in &report.level_ups {
        if let Err(e) = notify::announce_level_change(&task.http, channel_id, change).await {
            tracing::warn!(user_id = change.user_id, "Failed to announce voice level up: {}", e);
        }
    }
}
