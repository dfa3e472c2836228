use crate::leveling::level::level_for_xp;
use chrono::{DateTime, Utc};

pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// XP and level of one member in one guild.
///
/// `level` is always derived from `xp`; build values with [`UserProgress::from_xp`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserProgress {
    pub xp: i64,
    pub level: i64,
}

impl UserProgress {
    pub fn from_xp(xp: i64) -> Self {
        let xp = xp.max(0);
        Self {
            xp,
            level: level_for_xp(xp),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuildMultiplier {
    pub multiplier: f64,
    /// Unix timestamp in seconds; `None` means permanent.
    pub expires_at: Option<i64>,
}

impl Default for GuildMultiplier {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
            expires_at: None,
        }
    }
}

impl GuildMultiplier {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now.timestamp() > expires_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: u64,
    pub xp: i64,
    pub level: i64,
}
