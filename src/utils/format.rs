use crate::database::models::{GuildMultiplier, UserProgress};
use crate::leveling::level::xp_for_level;
use poise::serenity_prelude as serenity;

/// `1234567` -> `1,234,567`
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_error_message(error: &str) -> String {
    format!("❌ **Error**: {}", error)
}

pub fn format_success_message(message: &str) -> String {
    format!("✅ {}", message)
}

pub fn format_level_up(mention: &str, level: i64) -> String {
    format!("🎉 {} leveled up to **Level {}**!", mention, level)
}

pub fn format_level_down(mention: &str, level: i64) -> String {
    format!("{} dropped to **Level {}**.", mention, level)
}

pub fn format_multiplier_duration(setting: &GuildMultiplier, minutes: i64) -> String {
    match setting.expires_at {
        Some(expires_at) => format!("for {} minutes (until <t:{}:t>)", minutes, expires_at),
        None => "permanently".to_string(),
    }
}

pub fn rank_medal(position: usize) -> &'static str {
    match position {
        1 => "🥇 ",
        2 => "🥈 ",
        3 => "🥉 ",
        _ => "",
    }
}

/// Leaderboard label for a member whose profile could not be fetched.
pub fn leaderboard_fallback_name(user_id: u64, member_missing: bool) -> String {
    if member_missing {
        format!("Unknown User ({})", user_id)
    } else {
        format!("User {}", user_id)
    }
}

pub fn format_rank_progress(progress: &UserProgress) -> String {
    let next_level = progress.level + 1;
    let next_level_xp = xp_for_level(next_level);
    let xp_needed = next_level_xp - progress.xp;

    format!(
        "**{}** / **{}** XP\n**{}** XP needed for Level {}",
        format_number(progress.xp),
        format_number(next_level_xp),
        format_number(xp_needed),
        next_level
    )
}

// Embed utility functions
pub fn create_success_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0x2ecc71) // Green
        .timestamp(chrono::Utc::now())
}

pub fn create_error_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0xe74c3c) // Red
        .timestamp(chrono::Utc::now())
}

pub fn create_info_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0x5865f2) // Blurple
        .timestamp(chrono::Utc::now())
}

pub fn create_rank_embed(
    display_name: &str,
    avatar_url: Option<String>,
    progress: &UserProgress,
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}'s Rank", display_name))
        .color(0x3498db) // Blue
        .field("Level", format!("**{}**", progress.level), true)
        .field("XP", format!("**{}**", format_number(progress.xp)), true)
        .field("Progress", format_rank_progress(progress), false);

    if let Some(url) = avatar_url {
        embed = embed.thumbnail(url);
    }
    embed
}

/// One `(display name, level, xp)` row per ranked member, best first.
pub fn create_leaderboard_embed(
    guild_name: &str,
    rows: &[(String, i64, i64)],
) -> serenity::CreateEmbed {
    let fields = rows.iter().enumerate().map(|(i, (name, level, xp))| {
        let position = i + 1;
        (
            format!("{}#{}: {}", rank_medal(position), position, name),
            format!("Level: **{}** | XP: **{}**", level, format_number(*xp)),
            false,
        )
    });

    serenity::CreateEmbed::new()
        .title(format!("Top {} Users in {}", rows.len(), guild_name))
        .description("Ranked by XP gained")
        .color(0xf1c40f) // Gold
        .fields(fields)
        .timestamp(chrono::Utc::now())
}
