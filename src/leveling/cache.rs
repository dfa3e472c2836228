//! Time-bounded memoization of store reads.
//!
//! Entries live for a fixed TTL from insertion (not sliding). Expired entries
//! read as absent and are purged on the `get` that finds them.

use crate::database::models::{GuildMultiplier, UserProgress};
use crate::leveling::clock::Clock;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    User { user_id: u64, guild_id: u64 },
    Multiplier { guild_id: u64 },
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::User { user_id, guild_id } => write!(f, "user:{}:{}", user_id, guild_id),
            CacheKey::Multiplier { guild_id } => write!(f, "multiplier:{}", guild_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheValue {
    Progress(UserProgress),
    Multiplier(GuildMultiplier),
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: CacheValue,
    inserted_at: DateTime<Utc>,
}

pub struct LevelCache {
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl LevelCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl)
                .unwrap_or_else(|_| chrono::Duration::days(365 * 100)),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let now = self.clock.now();
        let mut entries = self.entries();

        let entry = *entries.get(key)?;
        if now - entry.inserted_at < self.ttl {
            return Some(entry.value);
        }

        entries.remove(key);
        tracing::debug!(key = %key, "cache entry expired");
        None
    }

    pub fn set(&self, key: CacheKey, value: CacheValue) {
        let inserted_at = self.clock.now();
        self.entries().insert(key, CacheEntry { value, inserted_at });
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.entries().remove(key);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn get_progress(&self, user_id: u64, guild_id: u64) -> Option<UserProgress> {
        match self.get(&CacheKey::User { user_id, guild_id })? {
            CacheValue::Progress(progress) => Some(progress),
            CacheValue::Multiplier(_) => None,
        }
    }

    pub fn set_progress(&self, user_id: u64, guild_id: u64, progress: UserProgress) {
        self.set(
            CacheKey::User { user_id, guild_id },
            CacheValue::Progress(progress),
        );
    }

    pub fn get_multiplier(&self, guild_id: u64) -> Option<GuildMultiplier> {
        match self.get(&CacheKey::Multiplier { guild_id })? {
            CacheValue::Multiplier(setting) => Some(setting),
            CacheValue::Progress(_) => None,
        }
    }

    pub fn set_multiplier(&self, guild_id: u64, setting: GuildMultiplier) {
        self.set(
            CacheKey::Multiplier { guild_id },
            CacheValue::Multiplier(setting),
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries().len()
    }
}
