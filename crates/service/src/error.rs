//! Typed error enum for the service layer.
//!
//! Unifies core (domain) and storage failures into a single error type.
//! Nothing is retried or swallowed here: every failure is returned to the
//! caller, which decides on user-facing messaging.

use schatzkarte_core::CoreError;
use schatzkarte_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying domain and storage failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation (invalid input, not unlocked, condition unmet).
    #[error("domain: {0}")]
    Core(#[from] CoreError),

    /// Storage operation failed; propagated unchanged from the store.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::InvalidInput(msg.into()))
    }

    /// Whether this error means the target module is still locked.
    pub fn is_not_unlocked(&self) -> bool {
        matches!(self, Self::Core(CoreError::NotUnlocked(_)))
    }

    /// Whether this error means a reward's unlock condition failed.
    pub fn is_condition_not_met(&self) -> bool {
        matches!(self, Self::Core(CoreError::ConditionNotMet(_)))
    }

    /// Whether this error is caller-fixable bad input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Core(CoreError::InvalidInput(_)))
    }
}
