//! Level and streak derivation.
//!
//! Both are pure functions: level is a monotone step function of cumulative
//! XP, and the streak advance takes "today" as an opaque caller-provided
//! date (the day-boundary / timezone policy lives with the caller).

use chrono::NaiveDate;

/// Cumulative XP required to reach level index + 1.
///
/// Level 1 starts at 0 XP. Recomputing `level_for_xp(total_xp)` at any time
/// must agree with the incrementally maintained `UserStats.level`.
const LEVEL_THRESHOLDS: [u32; 10] =
    [0, 100, 250, 450, 700, 1000, 1350, 1750, 2200, 2700];

/// Level reached at `total_xp`. Monotone: more XP never lowers the level.
pub fn level_for_xp(total_xp: u32) -> u32 {
    LEVEL_THRESHOLDS
        .iter()
        .rposition(|&threshold| total_xp >= threshold)
        .map(|idx| idx as u32 + 1)
        .unwrap_or(1)
}

/// XP still needed for the next level, `None` at the cap.
pub fn xp_to_next_level(total_xp: u32) -> Option<u32> {
    LEVEL_THRESHOLDS
        .iter()
        .find(|&&threshold| threshold > total_xp)
        .map(|&threshold| threshold - total_xp)
}

/// Advance a consecutive-day streak for an activity happening `today`.
///
/// - Last activity today: already counted, unchanged.
/// - Last activity exactly yesterday: streak + 1.
/// - First activity ever, or a gap: reset to 1.
///
/// Returns the new streak length; at most one increment per calendar day.
pub fn advance_streak(streak_days: u32, last_activity: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last_activity {
        Some(last) if last == today => streak_days,
        Some(last) if today - last == chrono::Duration::days(1) => streak_days + 1,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_steps_at_thresholds() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(249), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_for_xp(2700), 10);
        assert_eq!(level_for_xp(1_000_000), 10);
    }

    #[test]
    fn level_is_monotone() {
        let mut previous = 0;
        for xp in 0..3000 {
            let level = level_for_xp(xp);
            assert!(level >= previous, "level dropped at {xp} XP");
            previous = level;
        }
    }

    #[test]
    fn xp_to_next_level_matches_thresholds() {
        assert_eq!(xp_to_next_level(0), Some(100));
        assert_eq!(xp_to_next_level(90), Some(10));
        assert_eq!(xp_to_next_level(100), Some(150));
        assert_eq!(xp_to_next_level(2700), None);
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn streak_same_day_is_noop() {
        let today = date(2025, 3, 10);
        assert_eq!(advance_streak(4, Some(today), today), 4);
    }

    #[test]
    fn streak_consecutive_day_increments() {
        assert_eq!(advance_streak(4, Some(date(2025, 3, 9)), date(2025, 3, 10)), 5);
    }

    #[test]
    fn streak_gap_resets_to_one() {
        assert_eq!(advance_streak(4, Some(date(2025, 3, 7)), date(2025, 3, 10)), 1);
        assert_eq!(advance_streak(0, None, date(2025, 3, 10)), 1);
    }
}
