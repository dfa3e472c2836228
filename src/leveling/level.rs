//! Level curve: `level = floor(xp^(1/4))`, so level `n` starts at `n^4` XP.

/// Integer fourth root of `xp`, clamped at zero for negative input.
pub fn level_for_xp(xp: i64) -> i64 {
    if xp <= 0 {
        return 0;
    }

    // Float estimate, then corrected so boundaries like 81 -> 3 are exact.
    let mut level = (xp as f64).sqrt().sqrt().floor() as i64;
    while level > 0 && xp_for_level(level) > xp {
        level -= 1;
    }
    while (level + 1).checked_pow(4).is_some_and(|next| next <= xp) {
        level += 1;
    }
    level
}

/// XP at which `level` is reached.
pub fn xp_for_level(level: i64) -> i64 {
    if level <= 0 {
        return 0;
    }
    level.checked_pow(4).unwrap_or(i64::MAX)
}

/// XP still missing before the next level.
pub fn xp_to_next_level(xp: i64) -> i64 {
    xp_for_level(level_for_xp(xp) + 1) - xp.max(0)
}
