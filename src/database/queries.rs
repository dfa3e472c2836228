use crate::database::models::{GuildMultiplier, LeaderboardEntry, UserProgress};
use sqlx::{Row, SqlitePool};

// Discord snowflakes fit in 63 bits, so they round-trip through sqlite INTEGER.
fn snowflake(id: u64) -> i64 {
    id as i64
}

// User progress queries
pub async fn get_user_progress(
    pool: &SqlitePool,
    user_id: u64,
    guild_id: u64,
) -> Result<Option<UserProgress>, sqlx::Error> {
    let row_opt = sqlx::query("SELECT xp, level FROM users WHERE user_id = ? AND guild_id = ?")
        .bind(snowflake(user_id))
        .bind(snowflake(guild_id))
        .fetch_optional(pool)
        .await?;

    Ok(row_opt.map(|row| UserProgress {
        xp: row.get("xp"),
        level: row.get("level"),
    }))
}

/// Creates the `{0, 0}` row for a member seen for the first time.
pub async fn insert_user_if_missing(
    pool: &SqlitePool,
    user_id: u64,
    guild_id: u64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO users (user_id, guild_id, xp, level) VALUES (?, ?, 0, 0)")
        .bind(snowflake(user_id))
        .bind(snowflake(guild_id))
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn upsert_user_progress(
    pool: &SqlitePool,
    user_id: u64,
    guild_id: u64,
    progress: UserProgress,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (user_id, guild_id, xp, level) VALUES (?, ?, ?, ?)
         ON CONFLICT(user_id, guild_id)
         DO UPDATE SET xp = excluded.xp, level = excluded.level",
    )
    .bind(snowflake(user_id))
    .bind(snowflake(guild_id))
    .bind(progress.xp)
    .bind(progress.level)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_all_for_guild(pool: &SqlitePool, guild_id: u64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE guild_id = ?")
        .bind(snowflake(guild_id))
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn top_users(
    pool: &SqlitePool,
    guild_id: u64,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT user_id, xp, level FROM users
         WHERE guild_id = ?
         ORDER BY xp DESC
         LIMIT ?",
    )
    .bind(snowflake(guild_id))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let entries = rows
        .into_iter()
        .map(|row| LeaderboardEntry {
            user_id: row.get::<i64, _>("user_id") as u64,
            xp: row.get("xp"),
            level: row.get("level"),
        })
        .collect();

    Ok(entries)
}

// Guild settings queries
pub async fn get_guild_multiplier(
    pool: &SqlitePool,
    guild_id: u64,
) -> Result<Option<GuildMultiplier>, sqlx::Error> {
    let row_opt = sqlx::query("SELECT xp_multiplier, expires_at FROM settings WHERE guild_id = ?")
        .bind(snowflake(guild_id))
        .fetch_optional(pool)
        .await?;

    Ok(row_opt.map(|row| GuildMultiplier {
        multiplier: row.get("xp_multiplier"),
        expires_at: row.get("expires_at"),
    }))
}

pub async fn set_guild_multiplier(
    pool: &SqlitePool,
    guild_id: u64,
    setting: GuildMultiplier,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO settings (guild_id, xp_multiplier, expires_at) VALUES (?, ?, ?)
         ON CONFLICT(guild_id)
         DO UPDATE SET xp_multiplier = excluded.xp_multiplier, expires_at = excluded.expires_at",
    )
    .bind(snowflake(guild_id))
    .bind(setting.multiplier)
    .bind(setting.expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_helpers::create_test_pool;

    #[tokio::test]
    async fn missing_user_reads_as_none_until_inserted() {
        let pool = create_test_pool().await;

        assert_eq!(get_user_progress(&pool, 1, 10).await.unwrap(), None);

        insert_user_if_missing(&pool, 1, 10).await.unwrap();
        insert_user_if_missing(&pool, 1, 10).await.unwrap();

        assert_eq!(
            get_user_progress(&pool, 1, 10).await.unwrap(),
            Some(UserProgress::default())
        );
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_row() {
        let pool = create_test_pool().await;

        upsert_user_progress(&pool, 1, 10, UserProgress::from_xp(20)).await.unwrap();
        upsert_user_progress(&pool, 1, 10, UserProgress::from_xp(90)).await.unwrap();

        let progress = get_user_progress(&pool, 1, 10).await.unwrap().unwrap();
        assert_eq!(progress, UserProgress { xp: 90, level: 3 });
    }

    #[tokio::test]
    async fn top_users_orders_by_xp_and_scopes_to_guild() {
        let pool = create_test_pool().await;

        upsert_user_progress(&pool, 1, 10, UserProgress::from_xp(5)).await.unwrap();
        upsert_user_progress(&pool, 2, 10, UserProgress::from_xp(500)).await.unwrap();
        upsert_user_progress(&pool, 3, 10, UserProgress::from_xp(50)).await.unwrap();
        upsert_user_progress(&pool, 4, 20, UserProgress::from_xp(9_999)).await.unwrap();

        let top = top_users(&pool, 10, 2).await.unwrap();
        let ids: Vec<u64> = top.iter().map(|entry| entry.user_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn large_snowflakes_round_trip() {
        let pool = create_test_pool().await;
        let user_id = 1_242_051_406_580_416_574;
        let guild_id = 1_352_349_213_614_145_547;

        upsert_user_progress(&pool, user_id, guild_id, UserProgress::from_xp(1)).await.unwrap();

        let top = top_users(&pool, guild_id, 1).await.unwrap();
        assert_eq!(top[0].user_id, user_id);
    }

    #[tokio::test]
    async fn delete_all_for_guild_reports_count() {
        let pool = create_test_pool().await;

        upsert_user_progress(&pool, 1, 10, UserProgress::from_xp(5)).await.unwrap();
        upsert_user_progress(&pool, 2, 10, UserProgress::from_xp(6)).await.unwrap();
        upsert_user_progress(&pool, 1, 20, UserProgress::from_xp(7)).await.unwrap();

        assert_eq!(delete_all_for_guild(&pool, 10).await.unwrap(), 2);
        assert!(top_users(&pool, 10, 10).await.unwrap().is_empty());
        assert_eq!(top_users(&pool, 20, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn multiplier_upsert_and_read() {
        let pool = create_test_pool().await;

        assert_eq!(get_guild_multiplier(&pool, 10).await.unwrap(), None);

        let timed = GuildMultiplier { multiplier: 2.5, expires_at: Some(1_700_000_000) };
        set_guild_multiplier(&pool, 10, timed).await.unwrap();
        assert_eq!(get_guild_multiplier(&pool, 10).await.unwrap(), Some(timed));

        set_guild_multiplier(&pool, 10, GuildMultiplier::default()).await.unwrap();
        assert_eq!(
            get_guild_multiplier(&pool, 10).await.unwrap(),
            Some(GuildMultiplier::default())
        );
    }
}
