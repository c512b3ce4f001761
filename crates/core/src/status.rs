//! Status projection: the per-module display state for one user.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Catalog, ModuleId};

/// Display status of one island on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    Locked,
    Unlocked,
    Current,
    Completed,
}

impl ModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Current => "current",
            Self::Completed => "completed",
        }
    }
}

/// Project a status for every module in catalog order.
///
/// `Current` is the last module in catalog order that is unlocked and not
/// completed. Exactly one module is current whenever some unlocked module is
/// incomplete; none when everything unlocked is done. The tie-break is
/// declaration order, never timestamps, so preview mode (which has no unlock
/// timestamps) projects identically.
pub fn project_statuses(
    catalog: &Catalog,
    unlocked: &[ModuleId],
    completed: &HashSet<ModuleId>,
) -> Vec<(ModuleId, ModuleStatus)> {
    let unlocked_set: HashSet<&ModuleId> = unlocked.iter().collect();

    let current = catalog
        .modules()
        .iter()
        .rev()
        .find(|m| unlocked_set.contains(&m.id) && !completed.contains(&m.id))
        .map(|m| m.id.clone());

    catalog
        .modules()
        .iter()
        .map(|m| {
            let status = if !unlocked_set.contains(&m.id) {
                ModuleStatus::Locked
            } else if completed.contains(&m.id) {
                ModuleStatus::Completed
            } else if Some(&m.id) == current.as_ref() {
                ModuleStatus::Current
            } else {
                ModuleStatus::Unlocked
            };
            (m.id.clone(), status)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EffectiveWeek;

    fn completed(raw: &[&str]) -> HashSet<ModuleId> {
        raw.iter().map(|s| ModuleId::from(*s)).collect()
    }

    fn statuses_at(week: u32, done: &[&str]) -> Vec<(ModuleId, ModuleStatus)> {
        let catalog = Catalog::standard();
        let unlocked = catalog.resolve_unlocked(EffectiveWeek::Week(week));
        project_statuses(&catalog, &unlocked, &completed(done))
    }

    fn status_of(statuses: &[(ModuleId, ModuleStatus)], id: &str) -> ModuleStatus {
        statuses
            .iter()
            .find(|(m, _)| m.as_str() == id)
            .map(|(_, s)| *s)
            .unwrap()
    }

    #[test]
    fn last_unlocked_incomplete_is_current() {
        let statuses = statuses_at(3, &[]);
        assert_eq!(status_of(&statuses, "faeden"), ModuleStatus::Current);
        assert_eq!(status_of(&statuses, "werkzeuge"), ModuleStatus::Unlocked);
        assert_eq!(status_of(&statuses, "start"), ModuleStatus::Unlocked);
        assert_eq!(status_of(&statuses, "bruecken"), ModuleStatus::Locked);
    }

    #[test]
    fn completed_last_module_shifts_current_back() {
        let statuses = statuses_at(3, &["faeden"]);
        assert_eq!(status_of(&statuses, "faeden"), ModuleStatus::Completed);
        assert_eq!(status_of(&statuses, "werkzeuge"), ModuleStatus::Current);
    }

    #[test]
    fn exactly_one_current_unless_all_done() {
        // "start" alone never exhausts the unlocked set, so exactly one
        // module must be current at every week.
        for week in 0..=15 {
            for done in [vec![], vec!["start"]] {
                let statuses = statuses_at(week, &done);
                let currents =
                    statuses.iter().filter(|(_, s)| *s == ModuleStatus::Current).count();
                assert_eq!(currents, 1, "week {week}, done {done:?}");
            }
        }
    }

    #[test]
    fn no_current_when_all_unlocked_completed() {
        let statuses = statuses_at(0, &["start", "festung"]);
        let currents = statuses.iter().filter(|(_, s)| *s == ModuleStatus::Current).count();
        assert_eq!(currents, 0);
        assert_eq!(status_of(&statuses, "start"), ModuleStatus::Completed);
        assert_eq!(status_of(&statuses, "festung"), ModuleStatus::Completed);
    }

    #[test]
    fn locked_wins_over_completed_flags() {
        // Completion data for a still-locked module must not surface it.
        let statuses = statuses_at(0, &["bruecken"]);
        assert_eq!(status_of(&statuses, "bruecken"), ModuleStatus::Locked);
    }
}
