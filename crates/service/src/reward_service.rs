//! Reward ledger write path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use schatzkarte_core::{Catalog, CoreError, EffectiveWeek, ModuleId, UserStats};
use schatzkarte_storage::traits::ProgressStore;
use serde::Serialize;

use crate::Result;

/// Outcome of a collect call. A duplicate is not an error: it comes back as
/// `accepted = false, xp_awarded = 0` with stats unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct CollectOutcome {
    pub accepted: bool,
    pub xp_awarded: u32,
    pub stats: UserStats,
}

pub struct RewardService {
    catalog: Arc<Catalog>,
    store: Arc<dyn ProgressStore>,
}

impl RewardService {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn ProgressStore>) -> Self {
        Self { catalog, store }
    }

    /// Collect a reward for a user.
    ///
    /// The unlock check is re-derived from `week` at call time, never read
    /// from a cache. Checks run in order: module exists, module unlocked,
    /// reward exists, reward condition met; only then does the idempotent
    /// ledger insert happen.
    pub fn collect_reward(
        &self,
        user_id: &str,
        module_id: &ModuleId,
        reward_id: &str,
        week: EffectiveWeek,
        now: DateTime<Utc>,
    ) -> Result<CollectOutcome> {
        let module = self
            .catalog
            .get(module_id)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown module: {module_id}")))?;

        if !self.catalog.is_unlocked(module_id, week) {
            return Err(CoreError::NotUnlocked(module_id.to_string()).into());
        }

        let reward = module.reward(reward_id).ok_or_else(|| {
            CoreError::InvalidInput(format!("unknown reward {reward_id} in module {module_id}"))
        })?;

        if let Some(condition) = reward.condition {
            let state = self.store.condition_state(user_id)?;
            if !condition.is_met(&state) {
                return Err(CoreError::ConditionNotMet(condition.as_str().to_owned()).into());
            }
        }

        let accepted =
            self.store
                .insert_collected(user_id, module_id, reward_id, reward.xp_value, now)?;
        let stats = self.store.get_stats(user_id)?;

        if accepted {
            tracing::info!(
                user = user_id,
                module = %module_id,
                reward = reward_id,
                xp = reward.xp_value,
                "reward collected"
            );
            Ok(CollectOutcome { accepted: true, xp_awarded: reward.xp_value, stats })
        } else {
            tracing::debug!(
                user = user_id,
                module = %module_id,
                reward = reward_id,
                "reward already collected, no-op"
            );
            Ok(CollectOutcome { accepted: false, xp_awarded: 0, stats })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schatzkarte_storage::Storage;
    use tempfile::TempDir;

    fn setup() -> (RewardService, Arc<dyn ProgressStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store: Arc<dyn ProgressStore> =
            Arc::new(Storage::new(&temp_dir.path().join("test.db")).unwrap());
        let service = RewardService::new(Arc::new(Catalog::standard()), store.clone());
        (service, store, temp_dir)
    }

    #[test]
    fn collect_then_repeat_is_idempotent() {
        let (service, _store, _tmp) = setup();
        let festung = ModuleId::from("festung");

        let first = service
            .collect_reward("u1", &festung, "schild", EffectiveWeek::Week(0), Utc::now())
            .unwrap();
        assert!(first.accepted);
        assert_eq!(first.xp_awarded, 50);
        assert_eq!(first.stats.total_xp, 50);

        let second = service
            .collect_reward("u1", &festung, "schild", EffectiveWeek::Week(0), Utc::now())
            .unwrap();
        assert!(!second.accepted);
        assert_eq!(second.xp_awarded, 0);
        assert_eq!(second.stats.total_xp, 50);
    }

    #[test]
    fn locked_module_is_rejected_without_insert() {
        let (service, store, _tmp) = setup();
        let bruecken = ModuleId::from("bruecken");

        let err = service
            .collect_reward("u1", &bruecken, "seil", EffectiveWeek::Week(0), Utc::now())
            .unwrap_err();
        assert!(err.is_not_unlocked());
        assert_eq!(store.get_stats("u1").unwrap().total_xp, 0);
        assert!(store.collected_rewards("u1").unwrap().is_empty());
    }

    #[test]
    fn all_open_preview_unlocks_everything() {
        let (service, _store, _tmp) = setup();
        let finale = ModuleId::from("meister_berg");

        let outcome = service
            .collect_reward("u1", &finale, "krone", EffectiveWeek::AllOpen, Utc::now())
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.xp_awarded, 100);
    }

    #[test]
    fn condition_gates_until_state_recorded() {
        let (service, store, _tmp) = setup();
        let festung = ModuleId::from("festung");

        // "fahne" requires a first goal
        let err = service
            .collect_reward("u1", &festung, "fahne", EffectiveWeek::Week(0), Utc::now())
            .unwrap_err();
        assert!(err.is_condition_not_met());

        store.record_goal_set("u1", "g1", "Ziel", Utc::now()).unwrap();
        let outcome = service
            .collect_reward("u1", &festung, "fahne", EffectiveWeek::Week(0), Utc::now())
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.xp_awarded, 25);
    }

    #[test]
    fn unknown_module_and_reward_are_invalid_input() {
        let (service, _store, _tmp) = setup();

        let err = service
            .collect_reward("u1", &ModuleId::from("atlantis"), "x", EffectiveWeek::AllOpen, Utc::now())
            .unwrap_err();
        assert!(err.is_invalid_input());

        let err = service
            .collect_reward(
                "u1",
                &ModuleId::from("festung"),
                "unbekannt",
                EffectiveWeek::Week(0),
                Utc::now(),
            )
            .unwrap_err();
        assert!(err.is_invalid_input());
    }
}
