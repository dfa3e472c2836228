//! Periodic voice-presence accrual.
//!
//! A tick works on a snapshot of voice channels taken before it starts. All
//! awards are planned first and only then written, one member at a time.

use crate::config::LevelingConfig;
use crate::leveling::ledger::{Ledger, XpChange};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceMember {
    pub user_id: u64,
    pub is_bot: bool,
    pub is_afk: bool,
}

impl VoiceMember {
    fn is_eligible(&self) -> bool {
        !self.is_bot && !self.is_afk
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChannelSnapshot {
    pub channel_id: u64,
    pub members: Vec<VoiceMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildVoiceSnapshot {
    pub guild_id: u64,
    pub channels: Vec<VoiceChannelSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub user_id: u64,
    pub guild_id: u64,
    pub amount: i64,
}

#[derive(Debug, Default)]
pub struct VoiceTickReport {
    pub awarded: usize,
    pub failed: usize,
    pub level_ups: Vec<XpChange>,
}

/// `floor(base * multiplier)`, never negative.
pub fn scaled_gain(base: i64, multiplier: f64) -> i64 {
    let gain = (base as f64 * multiplier).floor();
    if gain.is_finite() && gain > 0.0 {
        gain as i64
    } else {
        0
    }
}

/// Awards for one guild given its per-tick gain. Empty when `gain <= 0`.
pub fn plan_guild_awards(
    config: &LevelingConfig,
    guild: &GuildVoiceSnapshot,
    gain: i64,
) -> Vec<XpAward> {
    if gain <= 0 {
        return Vec::new();
    }

    let mut awards = Vec::new();
    for channel in &guild.channels {
        if config.is_blacklisted_voice_channel(channel.channel_id) {
            continue;
        }

        let eligible: Vec<&VoiceMember> =
            channel.members.iter().filter(|m| m.is_eligible()).collect();
        if eligible.len() < config.min_voice_users {
            continue;
        }

        let amount = if config.is_bonus_channel(channel.channel_id) {
            gain.saturating_mul(2)
        } else {
            gain
        };

        awards.extend(eligible.into_iter().map(|member| XpAward {
            user_id: member.user_id,
            guild_id: guild.guild_id,
            amount,
        }));
    }
    awards
}

/// Runs one voice tick over `guilds`.
///
/// A guild whose multiplier cannot be read is skipped; a member whose write
/// fails is counted and logged. Neither aborts the tick.
pub async fn run_voice_tick(
    ledger: &Ledger,
    config: &LevelingConfig,
    guilds: &[GuildVoiceSnapshot],
) -> VoiceTickReport {
    let mut awards = Vec::new();

    for guild in guilds {
        let multiplier = match ledger.get_multiplier(guild.guild_id).await {
            Ok(multiplier) => multiplier,
            Err(e) => {
                error!(guild_id = guild.guild_id, "Voice XP scan failed for guild: {}", e);
                continue;
            }
        };

        let gain = scaled_gain(config.base_voice_xp, multiplier);
        awards.extend(plan_guild_awards(config, guild, gain));
    }

    let mut report = VoiceTickReport::default();
    for award in awards {
        match ledger.add_xp(award.user_id, award.guild_id, award.amount).await {
            Ok(change) => {
                report.awarded += 1;
                if change.leveled_up() {
                    info!(
                        user_id = change.user_id,
                        guild_id = change.guild_id,
                        level = change.progress.level,
                        "Member leveled up from voice activity"
                    );
                    report.level_ups.push(change);
                }
            }
            Err(e) => {
                report.failed += 1;
                warn!(
                    user_id = award.user_id,
                    guild_id = award.guild_id,
                    amount = award.amount,
                    "Failed to apply voice XP: {}",
                    e
                );
            }
        }
    }

    ledger.prune_locks();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leveling::ledger::test_support::test_ledger;

    const GUILD: u64 = 10;
    const LOBBY: u64 = 100;
    const BONUS: u64 = 200;
    const BLACKLISTED: u64 = 300;

    fn member(user_id: u64) -> VoiceMember {
        VoiceMember { user_id, is_bot: false, is_afk: false }
    }

    fn config() -> LevelingConfig {
        LevelingConfig {
            base_voice_xp: 3,
            bonus_channels: [BONUS].into_iter().collect(),
            blacklisted_voice_channels: [BLACKLISTED].into_iter().collect(),
            ..LevelingConfig::default()
        }
    }

    fn guild(channels: Vec<VoiceChannelSnapshot>) -> GuildVoiceSnapshot {
        GuildVoiceSnapshot { guild_id: GUILD, channels }
    }

    fn channel(channel_id: u64, members: Vec<VoiceMember>) -> VoiceChannelSnapshot {
        VoiceChannelSnapshot { channel_id, members }
    }

    #[test]
    fn scaled_gain_floors() {
        assert_eq!(scaled_gain(1, 1.0), 1);
        assert_eq!(scaled_gain(1, 0.5), 0);
        assert_eq!(scaled_gain(5, 1.5), 7);
        assert_eq!(scaled_gain(3, 2.0), 6);
    }

    #[test]
    fn lone_member_gets_nothing() {
        let snapshot = guild(vec![channel(LOBBY, vec![member(1)])]);
        assert!(plan_guild_awards(&config(), &snapshot, 3).is_empty());
    }

    #[test]
    fn bots_and_afk_do_not_count_toward_minimum() {
        let snapshot = guild(vec![channel(
            LOBBY,
            vec![
                member(1),
                VoiceMember { user_id: 2, is_bot: true, is_afk: false },
                VoiceMember { user_id: 3, is_bot: false, is_afk: true },
            ],
        )]);
        assert!(plan_guild_awards(&config(), &snapshot, 3).is_empty());
    }

    #[test]
    fn bonus_channel_pair_gets_double() {
        let snapshot = guild(vec![channel(
            BONUS,
            vec![
                member(1),
                member(2),
                VoiceMember { user_id: 3, is_bot: true, is_afk: false },
            ],
        )]);

        let awards = plan_guild_awards(&config(), &snapshot, 3);
        assert_eq!(
            awards,
            vec![
                XpAward { user_id: 1, guild_id: GUILD, amount: 6 },
                XpAward { user_id: 2, guild_id: GUILD, amount: 6 },
            ]
        );
    }

    #[test]
    fn blacklisted_channel_skipped() {
        let snapshot = guild(vec![
            channel(BLACKLISTED, vec![member(1), member(2)]),
            channel(LOBBY, vec![member(3), member(4)]),
        ]);

        let awards = plan_guild_awards(&config(), &snapshot, 3);
        let users: Vec<u64> = awards.iter().map(|a| a.user_id).collect();
        assert_eq!(users, vec![3, 4]);
    }

    #[test]
    fn zero_gain_skips_guild() {
        let snapshot = guild(vec![channel(LOBBY, vec![member(1), member(2)])]);
        assert!(plan_guild_awards(&config(), &snapshot, 0).is_empty());
    }

    #[tokio::test]
    async fn tick_applies_multiplier_and_bonus() {
        let (ledger, _clock) = test_ledger().await;
        ledger.set_multiplier(GUILD, 2.0, 0).await.unwrap();

        let snapshot = guild(vec![
            channel(BONUS, vec![member(1), member(2)]),
            channel(LOBBY, vec![member(3)]),
        ]);

        let report = run_voice_tick(&ledger, &config(), &[snapshot]).await;

        assert_eq!(report.awarded, 2);
        assert_eq!(report.failed, 0);
        // 2 * floor(3 * 2.0)
        assert_eq!(ledger.get_user_progress(1, GUILD).await.unwrap().xp, 12);
        assert_eq!(ledger.get_user_progress(2, GUILD).await.unwrap().xp, 12);
        assert_eq!(ledger.get_user_progress(3, GUILD).await.unwrap().xp, 0);
        assert_eq!(report.level_ups.len(), 2);
    }

    #[tokio::test]
    async fn tick_reports_only_new_levels() {
        let (ledger, _clock) = test_ledger().await;
        ledger.add_xp(1, GUILD, 10).await.unwrap();
        ledger.add_xp(2, GUILD, 14).await.unwrap();

        let snapshot = guild(vec![channel(LOBBY, vec![member(1), member(2)])]);
        let report = run_voice_tick(&ledger, &config(), &[snapshot]).await;

        let leveled: Vec<u64> = report.level_ups.iter().map(|c| c.user_id).collect();
        assert_eq!(leveled, vec![2]);
        assert_eq!(report.level_ups[0].progress.level, 2);
    }
}
