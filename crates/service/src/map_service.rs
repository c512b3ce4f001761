//! Map view read path: the projection consumed by the front-end.

use std::collections::HashSet;
use std::sync::Arc;

use schatzkarte_core::{
    project_statuses, Catalog, EffectiveWeek, ModuleId, ModuleStatus, UserStats,
};
use schatzkarte_storage::traits::ProgressStore;
use serde::Serialize;

use crate::Result;

/// One reward as shown on the map.
#[derive(Debug, Clone, Serialize)]
pub struct RewardView {
    pub id: String,
    pub xp_value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<&'static str>,
    pub collected: bool,
}

/// One island as shown on the map.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleView {
    pub id: ModuleId,
    pub category: &'static str,
    pub unlock_week: u32,
    pub status: ModuleStatus,
    pub rewards: Vec<RewardView>,
}

/// The full treasure map for one user at one effective week.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub modules: Vec<ModuleView>,
    pub stats: UserStats,
}

pub struct MapService {
    catalog: Arc<Catalog>,
    store: Arc<dyn ProgressStore>,
}

impl MapService {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn ProgressStore>) -> Self {
        Self { catalog, store }
    }

    /// Assemble the map for `user_id` at `week`: unlock resolution, status
    /// projection, per-reward collected marks, and the stats aggregate.
    pub fn map_view(&self, user_id: &str, week: EffectiveWeek) -> Result<MapView> {
        let unlocked = self.catalog.resolve_unlocked(week);
        let progress = self.store.get_all_progress(user_id)?;

        let completed: HashSet<ModuleId> = self
            .catalog
            .modules()
            .iter()
            .filter(|m| {
                progress
                    .get(&m.id)
                    .is_some_and(|p| p.completes(m.category))
            })
            .map(|m| m.id.clone())
            .collect();

        let statuses = project_statuses(&self.catalog, &unlocked, &completed);

        let collected: HashSet<(String, String)> = self
            .store
            .collected_rewards(user_id)?
            .into_iter()
            .map(|r| (r.module_id, r.reward_id))
            .collect();

        let modules = self
            .catalog
            .modules()
            .iter()
            .zip(statuses)
            .map(|(module, (_, status))| ModuleView {
                id: module.id.clone(),
                category: module.category.as_str(),
                unlock_week: module.category.unlock_week(),
                status,
                rewards: module
                    .rewards
                    .iter()
                    .map(|r| RewardView {
                        id: r.id.clone(),
                        xp_value: r.xp_value,
                        condition: r.condition.map(|c| c.as_str()),
                        collected: collected
                            .contains(&(module.id.to_string(), r.id.clone())),
                    })
                    .collect(),
            })
            .collect();

        let stats = self.store.get_stats(user_id)?;
        Ok(MapView { modules, stats })
    }
}
