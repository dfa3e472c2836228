use crate::leveling::ValidationError;

pub const MIN_MULTIPLIER: f64 = 0.1;
pub const MAX_LEADERBOARD_SIZE: i64 = 25;

// Ten years; keeps `minutes * 60` far away from overflow.
const MAX_MULTIPLIER_MINUTES: i64 = 60 * 24 * 365 * 10;

pub fn validate_xp_amount(amount: i64) -> Result<i64, ValidationError> {
    if amount <= 0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    Ok(amount)
}

pub fn validate_multiplier(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::MultiplierNotFinite);
    }
    if value < MIN_MULTIPLIER {
        return Err(ValidationError::MultiplierBelowFloor(value));
    }
    Ok(value)
}

pub fn validate_multiplier_minutes(minutes: i64) -> Result<i64, ValidationError> {
    if minutes > MAX_MULTIPLIER_MINUTES {
        return Err(ValidationError::DurationOutOfRange(minutes));
    }
    Ok(minutes)
}

pub fn validate_leaderboard_limit(limit: i64) -> Result<i64, ValidationError> {
    if limit < 1 {
        return Err(ValidationError::InvalidLimit(limit));
    }
    Ok(limit)
}

/// Slash command input is forgiving: out-of-range counts are pulled into range.
pub fn clamp_leaderboard_count(count: Option<i64>) -> i64 {
    count.unwrap_or(10).clamp(1, MAX_LEADERBOARD_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_positive() {
        assert_eq!(validate_xp_amount(1), Ok(1));
        assert_eq!(validate_xp_amount(0), Err(ValidationError::NonPositiveAmount(0)));
        assert_eq!(validate_xp_amount(-3), Err(ValidationError::NonPositiveAmount(-3)));
    }

    #[test]
    fn multiplier_floor() {
        assert_eq!(validate_multiplier(0.1), Ok(0.1));
        assert_eq!(validate_multiplier(3.0), Ok(3.0));
        assert_eq!(
            validate_multiplier(0.05),
            Err(ValidationError::MultiplierBelowFloor(0.05))
        );
        assert_eq!(validate_multiplier(f64::NAN), Err(ValidationError::MultiplierNotFinite));
        assert_eq!(
            validate_multiplier(f64::INFINITY),
            Err(ValidationError::MultiplierNotFinite)
        );
    }

    #[test]
    fn minutes_upper_bound() {
        assert_eq!(validate_multiplier_minutes(0), Ok(0));
        assert_eq!(validate_multiplier_minutes(-5), Ok(-5));
        assert!(validate_multiplier_minutes(i64::MAX).is_err());
    }

    #[test]
    fn leaderboard_count_clamped() {
        assert_eq!(clamp_leaderboard_count(None), 10);
        assert_eq!(clamp_leaderboard_count(Some(0)), 1);
        assert_eq!(clamp_leaderboard_count(Some(100)), 25);
        assert_eq!(validate_leaderboard_limit(0), Err(ValidationError::InvalidLimit(0)));
    }
}
