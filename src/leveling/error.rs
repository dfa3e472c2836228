//! Leveling error types.

/// Input rejected at the ledger boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("XP amount must be a positive number (got {0})")]
    NonPositiveAmount(i64),

    #[error("Multiplier must be 0.1 or greater (got {0})")]
    MultiplierBelowFloor(f64),

    #[error("Multiplier must be a finite number")]
    MultiplierNotFinite,

    #[error("Duration of {0} minutes is out of range")]
    DurationOutOfRange(i64),

    #[error("Leaderboard size must be at least 1 (got {0})")]
    InvalidLimit(i64),
}

/// Leveling operation errors
#[derive(Debug, thiserror::Error)]
pub enum LevelingError {
    /// SQL error from sqlx
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type LevelingResult<T> = Result<T, LevelingError>;
