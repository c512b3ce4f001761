//! Progress store trait abstraction.
//!
//! The progression services depend on this contract, not on SQLite directly.
//! Idempotence of the reward ledger is the store's responsibility: the
//! uniqueness of (user, module, reward) must be enforced atomically at the
//! persistence boundary, not by in-memory locking in the caller.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use schatzkarte_core::{
    CollectedReward, ConditionState, ModuleId, ModuleProgress, ProgressFlag, UserStats,
};

use crate::Result;

pub trait ProgressStore: Send + Sync {
    /// Progress flags for one user x module, `None` if never touched.
    fn get_progress(&self, user_id: &str, module_id: &ModuleId)
        -> Result<Option<ModuleProgress>>;

    /// All per-module progress rows for a user.
    fn get_all_progress(&self, user_id: &str) -> Result<HashMap<ModuleId, ModuleProgress>>;

    /// Set a progress flag. Idempotent: an already-true flag keeps its first
    /// timestamp. Returns `true` if the flag transitioned.
    fn set_flag(
        &self,
        user_id: &str,
        module_id: &ModuleId,
        flag: ProgressFlag,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Whether the ledger already holds (user, module, reward).
    fn has_collected(&self, user_id: &str, module_id: &ModuleId, reward_id: &str)
        -> Result<bool>;

    /// Append a ledger row and update the stats aggregate in one transaction.
    ///
    /// Returns `false` without touching stats if the unique constraint on
    /// (user, module, reward) is violated — the idempotence guarantee.
    fn insert_collected(
        &self,
        user_id: &str,
        module_id: &ModuleId,
        reward_id: &str,
        xp: u32,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// All ledger rows for a user, oldest first.
    fn collected_rewards(&self, user_id: &str) -> Result<Vec<CollectedReward>>;

    /// Stats aggregate; zeroed defaults for a user with no row yet.
    fn get_stats(&self, user_id: &str) -> Result<UserStats>;

    /// Record a qualifying activity for `today`, advancing the streak.
    fn record_activity(&self, user_id: &str, today: NaiveDate) -> Result<UserStats>;

    /// Rebuild `total_xp` and `level` from the ledger sum. The result must
    /// always agree with the incrementally maintained aggregate.
    fn recompute_stats(&self, user_id: &str) -> Result<UserStats>;

    /// Record a newly set goal. Idempotent per (user, goal).
    fn record_goal_set(
        &self,
        user_id: &str,
        goal_id: &str,
        title: &str,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Mark a goal achieved. First achievement wins the timestamp.
    fn record_goal_achieved(&self, user_id: &str, goal_id: &str, at: DateTime<Utc>)
        -> Result<()>;

    /// Snapshot of recorded state that reward conditions evaluate against.
    fn condition_state(&self, user_id: &str) -> Result<ConditionState>;
}
