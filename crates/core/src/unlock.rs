//! Unlock resolution: which islands are open at a given effective week.
//!
//! The resolver is a pure function of (effective week, catalog). Identical
//! inputs yield an identical, catalog-ordered result; there is no clock
//! access and no randomness in here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Catalog, CoreError, ModuleId, Result};

/// The week number unlock thresholds are evaluated against.
///
/// `AllOpen` is the privileged "everything open" preview used by coaches;
/// it never represents a real learner's elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "week", rename_all = "snake_case")]
pub enum EffectiveWeek {
    Week(u32),
    AllOpen,
}

impl EffectiveWeek {
    /// Validate a raw week number from an untrusted caller.
    ///
    /// Negative values are rejected, not clamped: a negative week is a caller
    /// bug we want surfaced, not silently treated as week 0.
    pub fn from_raw(raw: i64) -> Result<Self> {
        if raw < 0 {
            return Err(CoreError::InvalidInput(format!(
                "effective week must be >= 0, got {raw}"
            )));
        }
        Ok(Self::Week(raw.min(i64::from(u32::MAX)) as u32))
    }

    /// Elapsed whole program weeks between enrollment and today, floor
    /// division, minimum 0. Day-boundary policy is the caller's: both dates
    /// arrive already resolved to the program timezone.
    pub fn elapsed(start_date: NaiveDate, today: NaiveDate) -> Self {
        let days = (today - start_date).num_days();
        if days <= 0 {
            Self::Week(0)
        } else {
            Self::Week((days / 7) as u32)
        }
    }
}

impl Catalog {
    /// Resolve the unlocked set at `week`, in catalog declaration order.
    pub fn resolve_unlocked(&self, week: EffectiveWeek) -> Vec<ModuleId> {
        match week {
            EffectiveWeek::AllOpen => self.modules().iter().map(|m| m.id.clone()).collect(),
            EffectiveWeek::Week(w) => self
                .modules()
                .iter()
                .filter(|m| w >= m.category.unlock_week())
                .map(|m| m.id.clone())
                .collect(),
        }
    }

    /// Whether a single module is unlocked at `week`.
    pub fn is_unlocked(&self, id: &ModuleId, week: EffectiveWeek) -> bool {
        match week {
            EffectiveWeek::AllOpen => self.contains(id),
            EffectiveWeek::Week(w) => self
                .get(id)
                .is_some_and(|m| w >= m.category.unlock_week()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<ModuleId> {
        raw.iter().map(|s| ModuleId::from(*s)).collect()
    }

    #[test]
    fn week_zero_unlocks_baseline_only() {
        let catalog = Catalog::standard();
        let unlocked = catalog.resolve_unlocked(EffectiveWeek::Week(0));
        assert_eq!(unlocked, ids(&["start", "festung"]));
    }

    #[test]
    fn week_three_unlocks_through_faeden() {
        let catalog = Catalog::standard();
        let unlocked = catalog.resolve_unlocked(EffectiveWeek::Week(3));
        assert_eq!(unlocked, ids(&["start", "festung", "werkzeuge", "faeden"]));
    }

    #[test]
    fn week_fourteen_includes_finale() {
        let catalog = Catalog::standard();
        let unlocked = catalog.resolve_unlocked(EffectiveWeek::Week(14));
        assert!(unlocked.contains(&ModuleId::from("meister_berg")));
        assert_eq!(unlocked.len(), catalog.len());
    }

    #[test]
    fn all_open_returns_full_catalog() {
        let catalog = Catalog::standard();
        let unlocked = catalog.resolve_unlocked(EffectiveWeek::AllOpen);
        assert_eq!(unlocked.len(), catalog.len());
        let in_order: Vec<ModuleId> =
            catalog.modules().iter().map(|m| m.id.clone()).collect();
        assert_eq!(unlocked, in_order);
    }

    #[test]
    fn resolver_is_monotone_in_week() {
        let catalog = Catalog::standard();
        let mut previous: Vec<ModuleId> = Vec::new();
        for week in 0..=20 {
            let current = catalog.resolve_unlocked(EffectiveWeek::Week(week));
            for id in &previous {
                assert!(current.contains(id), "week {week} lost {id}");
            }
            previous = current;
        }
    }

    #[test]
    fn huge_week_caps_at_full_catalog() {
        let catalog = Catalog::standard();
        let unlocked = catalog.resolve_unlocked(EffectiveWeek::Week(10_000));
        assert_eq!(unlocked.len(), catalog.len());
    }

    #[test]
    fn negative_raw_week_rejected() {
        assert!(matches!(
            EffectiveWeek::from_raw(-1),
            Err(CoreError::InvalidInput(_))
        ));
        assert_eq!(EffectiveWeek::from_raw(0).unwrap(), EffectiveWeek::Week(0));
        assert_eq!(EffectiveWeek::from_raw(7).unwrap(), EffectiveWeek::Week(7));
    }

    #[test]
    fn elapsed_weeks_floor_and_clamp() {
        let start = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let same_day = EffectiveWeek::elapsed(start, start);
        assert_eq!(same_day, EffectiveWeek::Week(0));

        let six_days = EffectiveWeek::elapsed(start, start + chrono::Days::new(6));
        assert_eq!(six_days, EffectiveWeek::Week(0));

        let seven_days = EffectiveWeek::elapsed(start, start + chrono::Days::new(7));
        assert_eq!(seven_days, EffectiveWeek::Week(1));

        let before_start =
            EffectiveWeek::elapsed(start, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap());
        assert_eq!(before_start, EffectiveWeek::Week(0));
    }
}
