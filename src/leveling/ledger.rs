//! Read-modify-write of XP, level, and guild multipliers.
//!
//! Every mutation goes through the store first and the cache second, so a
//! failed write never leaves a value in the cache that storage does not have.
//!
//! Lock order is guild gate (shared) then member mutex. A cache entry for a
//! member is only written while that member's mutex is held, and a guild
//! reset holds the gate exclusively.

use crate::database::models::{DEFAULT_MULTIPLIER, GuildMultiplier, LeaderboardEntry, UserProgress};
use crate::database::queries;
use crate::leveling::cache::{CacheKey, LevelCache};
use crate::leveling::clock::Clock;
use crate::leveling::error::LevelingResult;
use crate::leveling::locks::{KeyedLocks, KeyedRwLocks};
use crate::utils::validation::{
    validate_leaderboard_limit, validate_multiplier, validate_multiplier_minutes,
    validate_xp_amount,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a single add or remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpChange {
    pub user_id: u64,
    pub guild_id: u64,
    pub previous: UserProgress,
    pub progress: UserProgress,
}

impl XpChange {
    pub fn leveled_up(&self) -> bool {
        self.progress.level > self.previous.level
    }

    pub fn leveled_down(&self) -> bool {
        self.progress.level < self.previous.level
    }
}

pub struct Ledger {
    pool: SqlitePool,
    cache: Arc<LevelCache>,
    clock: Arc<dyn Clock>,
    locks: KeyedLocks<(u64, u64)>,
    guilds: KeyedRwLocks<u64>,
}

impl Ledger {
    pub fn new(pool: SqlitePool, cache: Arc<LevelCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            cache,
            clock,
            locks: KeyedLocks::new(),
            guilds: KeyedRwLocks::new(),
        }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get_user_progress(&self, user_id: u64, guild_id: u64) -> LevelingResult<UserProgress> {
        if let Some(progress) = self.cache.get_progress(user_id, guild_id) {
            return Ok(progress);
        }

        let _guild = self.guilds.read(guild_id).await;
        let _member = self.locks.lock((user_id, guild_id)).await;
        self.load_progress(user_id, guild_id).await
    }

    /// Caller must hold the member's lock.
    async fn load_progress(&self, user_id: u64, guild_id: u64) -> LevelingResult<UserProgress> {
        if let Some(progress) = self.cache.get_progress(user_id, guild_id) {
            return Ok(progress);
        }

        let progress = match queries::get_user_progress(&self.pool, user_id, guild_id).await? {
            Some(progress) => progress,
            None => {
                queries::insert_user_if_missing(&self.pool, user_id, guild_id).await?;
                UserProgress::default()
            }
        };

        self.cache.set_progress(user_id, guild_id, progress);
        Ok(progress)
    }

    pub async fn add_xp(&self, user_id: u64, guild_id: u64, amount: i64) -> LevelingResult<XpChange> {
        let amount = validate_xp_amount(amount)?;
        self.apply(user_id, guild_id, |xp| xp.saturating_add(amount)).await
    }

    pub async fn remove_xp(&self, user_id: u64, guild_id: u64, amount: i64) -> LevelingResult<XpChange> {
        let amount = validate_xp_amount(amount)?;
        self.apply(user_id, guild_id, |xp| (xp - amount).max(0)).await
    }

    async fn apply(
        &self,
        user_id: u64,
        guild_id: u64,
        update: impl FnOnce(i64) -> i64,
    ) -> LevelingResult<XpChange> {
        let _guild = self.guilds.read(guild_id).await;
        let _member = self.locks.lock((user_id, guild_id)).await;

        let previous = self.load_progress(user_id, guild_id).await?;
        let progress = UserProgress::from_xp(update(previous.xp));

        if let Err(e) = queries::upsert_user_progress(&self.pool, user_id, guild_id, progress).await {
            self.cache.invalidate(&CacheKey::User { user_id, guild_id });
            return Err(e.into());
        }
        self.cache.set_progress(user_id, guild_id, progress);

        debug!(user_id, guild_id, old_xp = previous.xp, new_xp = progress.xp, "XP updated");

        Ok(XpChange {
            user_id,
            guild_id,
            previous,
            progress,
        })
    }

    /// Effective multiplier for a guild; an expired record is reset to the default.
    pub async fn get_multiplier(&self, guild_id: u64) -> LevelingResult<f64> {
        let now = self.clock.now();

        if let Some(setting) = self.cache.get_multiplier(guild_id) {
            if !setting.is_expired(now) {
                return Ok(setting.multiplier);
            }
        }

        let Some(setting) = queries::get_guild_multiplier(&self.pool, guild_id).await? else {
            return Ok(DEFAULT_MULTIPLIER);
        };

        if setting.is_expired(now) {
            let reset = GuildMultiplier::default();
            queries::set_guild_multiplier(&self.pool, guild_id, reset).await?;
            self.cache.set_multiplier(guild_id, reset);
            info!(guild_id, expired = setting.multiplier, "XP multiplier expired, reset to default");
            return Ok(reset.multiplier);
        }

        self.cache.set_multiplier(guild_id, setting);
        Ok(setting.multiplier)
    }

    /// `minutes <= 0` makes the multiplier permanent.
    pub async fn set_multiplier(&self, guild_id: u64, value: f64, minutes: i64) -> LevelingResult<GuildMultiplier> {
        let value = validate_multiplier(value)?;
        let minutes = validate_multiplier_minutes(minutes)?;

        let expires_at = (minutes > 0).then(|| self.clock.now().timestamp() + minutes * 60);
        let setting = GuildMultiplier {
            multiplier: value,
            expires_at,
        };

        queries::set_guild_multiplier(&self.pool, guild_id, setting).await?;
        self.cache.set_multiplier(guild_id, setting);

        info!(guild_id, multiplier = value, ?expires_at, "XP multiplier set");
        Ok(setting)
    }

    pub async fn leaderboard(&self, guild_id: u64, limit: i64) -> LevelingResult<Vec<LeaderboardEntry>> {
        let limit = validate_leaderboard_limit(limit)?;
        Ok(queries::top_users(&self.pool, guild_id, limit).await?)
    }

    /// Deletes every member's progress in the guild. Multiplier settings survive.
    /// Waits for in-flight updates in the guild to finish first.
    pub async fn reset_guild(&self, guild_id: u64) -> LevelingResult<u64> {
        let _guild = self.guilds.write(guild_id).await;
        let deleted = queries::delete_all_for_guild(&self.pool, guild_id).await?;

        // The cache cannot enumerate one guild's keys, so drop everything.
        self.cache.clear();

        info!(guild_id, deleted, "Guild level data reset");
        Ok(deleted)
    }

    /// Releases per-member and per-guild locks that are no longer in use.
    pub fn prune_locks(&self) {
        self.locks.prune();
        self.guilds.prune();
    }
}
