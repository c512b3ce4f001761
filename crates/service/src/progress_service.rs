//! Progress flags, streak activity, and goal recording.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use schatzkarte_core::{Catalog, CoreError, ModuleId, ProgressFlag, UserStats};
use schatzkarte_storage::traits::ProgressStore;

use crate::Result;

pub struct ProgressService {
    catalog: Arc<Catalog>,
    store: Arc<dyn ProgressStore>,
}

impl ProgressService {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn ProgressStore>) -> Self {
        Self { catalog, store }
    }

    /// Set a progress flag for a catalog module. Idempotent; returns whether
    /// the flag actually transitioned.
    pub fn set_flag(
        &self,
        user_id: &str,
        module_id: &ModuleId,
        flag: ProgressFlag,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if !self.catalog.contains(module_id) {
            return Err(CoreError::InvalidInput(format!("unknown module: {module_id}")).into());
        }
        let transitioned = self.store.set_flag(user_id, module_id, flag, now)?;
        if transitioned {
            tracing::info!(user = user_id, module = %module_id, flag = flag.as_str(), "flag set");
        }
        Ok(transitioned)
    }

    /// Record a qualifying activity for the streak counter. `today` is
    /// resolved by the caller (its timezone policy, not ours).
    pub fn record_activity(&self, user_id: &str, today: NaiveDate) -> Result<UserStats> {
        Ok(self.store.record_activity(user_id, today)?)
    }

    pub fn get_stats(&self, user_id: &str) -> Result<UserStats> {
        Ok(self.store.get_stats(user_id)?)
    }

    /// Rebuild the stats aggregate from the reward ledger.
    pub fn recompute_stats(&self, user_id: &str) -> Result<UserStats> {
        Ok(self.store.recompute_stats(user_id)?)
    }

    /// Record a new personal goal; returns the generated goal id.
    pub fn set_goal(&self, user_id: &str, title: &str, now: DateTime<Utc>) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::InvalidInput("goal title must not be empty".into()).into());
        }
        let goal_id = uuid::Uuid::new_v4().to_string();
        self.store.record_goal_set(user_id, &goal_id, title, now)?;
        tracing::info!(user = user_id, goal = %goal_id, "goal set");
        Ok(goal_id)
    }

    pub fn achieve_goal(&self, user_id: &str, goal_id: &str, now: DateTime<Utc>) -> Result<()> {
        self.store.record_goal_achieved(user_id, goal_id, now)?;
        tracing::info!(user = user_id, goal = goal_id, "goal achieved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schatzkarte_storage::Storage;
    use tempfile::TempDir;

    fn setup() -> (ProgressService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store: Arc<dyn ProgressStore> =
            Arc::new(Storage::new(&temp_dir.path().join("test.db")).unwrap());
        let service = ProgressService::new(Arc::new(Catalog::standard()), store);
        (service, temp_dir)
    }

    #[test]
    fn flag_on_unknown_module_rejected() {
        let (service, _tmp) = setup();
        let err = service
            .set_flag("u1", &ModuleId::from("atlantis"), ProgressFlag::ContentViewed, Utc::now())
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn flag_set_reports_transition_once() {
        let (service, _tmp) = setup();
        let festung = ModuleId::from("festung");
        assert!(service
            .set_flag("u1", &festung, ProgressFlag::TaskPassed, Utc::now())
            .unwrap());
        assert!(!service
            .set_flag("u1", &festung, ProgressFlag::TaskPassed, Utc::now())
            .unwrap());
    }

    #[test]
    fn goal_lifecycle() {
        let (service, _tmp) = setup();
        let goal_id = service.set_goal("u1", "  Jeden Tag üben  ", Utc::now()).unwrap();
        service.achieve_goal("u1", &goal_id, Utc::now()).unwrap();

        assert!(service.set_goal("u1", "   ", Utc::now()).unwrap_err().is_invalid_input());
    }

    #[test]
    fn activity_and_stats() {
        let (service, _tmp) = setup();
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let stats = service.record_activity("u1", day).unwrap();
        assert_eq!(stats.streak_days, 1);
        assert_eq!(service.get_stats("u1").unwrap().streak_days, 1);
    }
}
