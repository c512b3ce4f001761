use std::result::Result as StdResult;

use thiserror::Error;

/// Errors surfaced by the progression core.
///
/// Duplicate reward collection is deliberately NOT an error: a repeated
/// collect is a no-op success (`accepted = false`), so retried client
/// requests never double-award XP and never see a failure either.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Module not unlocked: {0}")]
    NotUnlocked(String),

    #[error("Reward condition not met: {0}")]
    ConditionNotMet(String),
}

pub type Result<T> = StdResult<T, CoreError>;
