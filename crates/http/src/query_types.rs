//! Request/query types (Deserialize)

use chrono::NaiveDate;
use schatzkarte_core::{CoreError, EffectiveWeek};
use serde::Deserialize;

/// Resolve the effective week from request parameters.
///
/// Preview overrides win: `all_open` (coach "everything open" mode), then an
/// explicit `week` override. Normal learner mode derives elapsed weeks from
/// `start_date` and the server-side `today`. Exactly one path must apply.
pub fn resolve_week(
    week: Option<i64>,
    all_open: Option<bool>,
    start_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<EffectiveWeek, CoreError> {
    if all_open == Some(true) {
        return Ok(EffectiveWeek::AllOpen);
    }
    if let Some(raw) = week {
        return EffectiveWeek::from_raw(raw);
    }
    if let Some(start) = start_date {
        return Ok(EffectiveWeek::elapsed(start, today));
    }
    Err(CoreError::InvalidInput(
        "one of week, all_open, start_date is required".into(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    pub user: String,
    pub week: Option<i64>,
    pub all_open: Option<bool>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SetFlagRequest {
    pub user: String,
    pub module: String,
    pub flag: String,
}

#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    pub user: String,
    pub module: String,
    pub reward: String,
    pub week: Option<i64>,
    pub all_open: Option<bool>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub user: String,
    /// Activity day in the program timezone; defaults to the server's today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SetGoalRequest {
    pub user: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct AchieveGoalRequest {
    pub user: String,
    pub goal: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn all_open_wins_over_week() {
        let week = resolve_week(Some(3), Some(true), None, date(2025, 1, 1)).unwrap();
        assert_eq!(week, EffectiveWeek::AllOpen);
    }

    #[test]
    fn explicit_week_wins_over_start_date() {
        let week =
            resolve_week(Some(3), None, Some(date(2025, 1, 1)), date(2025, 3, 1)).unwrap();
        assert_eq!(week, EffectiveWeek::Week(3));
    }

    #[test]
    fn start_date_derives_elapsed_weeks() {
        let week = resolve_week(None, None, Some(date(2025, 1, 6)), date(2025, 1, 21)).unwrap();
        assert_eq!(week, EffectiveWeek::Week(2));
    }

    #[test]
    fn negative_week_and_missing_params_rejected() {
        assert!(resolve_week(Some(-1), None, None, date(2025, 1, 1)).is_err());
        assert!(resolve_week(None, None, None, date(2025, 1, 1)).is_err());
    }
}
