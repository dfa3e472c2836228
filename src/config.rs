use anyhow::{Context, Result};
use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub database_pool_size: u32,
    pub moderator_role_id: Option<u64>,
    pub level_up_channel_id: Option<u64>,
    pub leveling: LevelingConfig,
}

/// Accrual rules shared by the voice and message drivers.
#[derive(Debug, Clone)]
pub struct LevelingConfig {
    pub base_voice_xp: i64,
    pub base_message_xp: i64,
    pub min_voice_users: usize,
    pub voice_tick_interval: Duration,
    pub cache_ttl: Duration,
    pub blacklisted_voice_channels: HashSet<u64>,
    pub bonus_channels: HashSet<u64>,
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            base_voice_xp: 1,
            base_message_xp: 5,
            min_voice_users: 2,
            voice_tick_interval: Duration::from_secs(60),
            cache_ttl: Duration::from_secs(300),
            blacklisted_voice_channels: HashSet::new(),
            bonus_channels: HashSet::new(),
        }
    }
}

impl LevelingConfig {
    pub fn is_bonus_channel(&self, channel_id: u64) -> bool {
        self.bonus_channels.contains(&channel_id)
    }

    pub fn is_blacklisted_voice_channel(&self, channel_id: u64) -> bool {
        self.blacklisted_voice_channels.contains(&channel_id)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:leveling.db".to_string());

        let defaults = LevelingConfig::default();
        let leveling = LevelingConfig {
            base_voice_xp: env_or("BASE_VOICE_XP", defaults.base_voice_xp)?,
            base_message_xp: env_or("BASE_MESSAGE_XP", defaults.base_message_xp)?,
            min_voice_users: env_or("MIN_VOICE_USERS", defaults.min_voice_users)?,
            voice_tick_interval: Duration::from_secs(env_or("VOICE_TICK_SECONDS", 60u64)?),
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECONDS", 300u64)?),
            blacklisted_voice_channels: parse_id_list(
                &env::var("BLACKLISTED_VOICE_CHANNELS").unwrap_or_default(),
            )
            .context("BLACKLISTED_VOICE_CHANNELS")?,
            bonus_channels: parse_id_list(&env::var("BONUS_CHANNELS").unwrap_or_default())
                .context("BONUS_CHANNELS")?,
        };

        if leveling.voice_tick_interval.is_zero() {
            return Err(anyhow::anyhow!("VOICE_TICK_SECONDS must be greater than zero"));
        }

        Ok(Config {
            discord_token,
            database_url,
            database_pool_size: env_or("DATABASE_POOL_SIZE", 5u32)?,
            moderator_role_id: env_opt("MODERATOR_ROLE_ID")?,
            level_up_channel_id: env_opt("LEVEL_UP_CHANNEL_ID")?,
            leveling,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(env_opt(key)?.unwrap_or(default))
}

fn env_opt<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(key, &raw).map(Some),
        _ => Ok(None),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid value for {}: {:?} ({})", key, raw, e))
}

/// Parses a comma separated list of Discord snowflakes, ignoring blanks.
pub fn parse_id_list(raw: &str) -> Result<HashSet<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| anyhow::anyhow!("invalid channel id: {:?}", part))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_list_accepts_spaces_and_blanks() {
        let ids = parse_id_list(" 1352349213614145547, ,1242015121040080917,").unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1352349213614145547));
        assert!(ids.contains(&1242015121040080917));
    }

    #[test]
    fn parse_id_list_empty_is_empty_set() {
        assert!(parse_id_list("").unwrap().is_empty());
    }

    #[test]
    fn parse_id_list_rejects_garbage() {
        assert!(parse_id_list("123,abc").is_err());
    }

    #[test]
    fn parse_value_reports_key() {
        let err = parse_value::<i64>("BASE_VOICE_XP", "ten").unwrap_err();
        assert!(err.to_string().contains("BASE_VOICE_XP"));
        assert_eq!(parse_value::<i64>("BASE_VOICE_XP", " 3 ").unwrap(), 3);
    }

    #[test]
    fn default_rules() {
        let rules = LevelingConfig::default();
        assert_eq!(rules.base_voice_xp, 1);
        assert_eq!(rules.base_message_xp, 5);
        assert_eq!(rules.min_voice_users, 2);
        assert_eq!(rules.cache_ttl, Duration::from_secs(300));
    }
}
