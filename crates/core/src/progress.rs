//! Per-user progress state: flags, collected rewards, aggregate stats.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{CoreError, ModuleCategory, RewardCondition, Result};

/// The four completion flags tracked per user x module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressFlag {
    ContentViewed,
    ExplanationRead,
    TaskPassed,
    ChallengeCompleted,
}

impl ProgressFlag {
    pub const ALL: [Self; 4] = [
        Self::ContentViewed,
        Self::ExplanationRead,
        Self::TaskPassed,
        Self::ChallengeCompleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentViewed => "content_viewed",
            Self::ExplanationRead => "explanation_read",
            Self::TaskPassed => "task_passed",
            Self::ChallengeCompleted => "challenge_completed",
        }
    }
}

impl std::str::FromStr for ProgressFlag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "content_viewed" => Ok(Self::ContentViewed),
            "explanation_read" => Ok(Self::ExplanationRead),
            "task_passed" => Ok(Self::TaskPassed),
            "challenge_completed" => Ok(Self::ChallengeCompleted),
            other => Err(CoreError::InvalidInput(format!("unknown progress flag: {other}"))),
        }
    }
}

/// Progress flags for one user x module pair.
///
/// A timestamp is present iff its flag is true, and flags are monotone:
/// the store only ever sets them, never clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub content_viewed: Option<DateTime<Utc>>,
    pub explanation_read: Option<DateTime<Utc>>,
    pub task_passed: Option<DateTime<Utc>>,
    pub challenge_completed: Option<DateTime<Utc>>,
}

impl ModuleProgress {
    pub fn flag_at(&self, flag: ProgressFlag) -> Option<DateTime<Utc>> {
        match flag {
            ProgressFlag::ContentViewed => self.content_viewed,
            ProgressFlag::ExplanationRead => self.explanation_read,
            ProgressFlag::TaskPassed => self.task_passed,
            ProgressFlag::ChallengeCompleted => self.challenge_completed,
        }
    }

    pub fn is_set(&self, flag: ProgressFlag) -> bool {
        self.flag_at(flag).is_some()
    }

    /// First-set-wins: setting an already-true flag keeps its original
    /// timestamp. Returns `true` if the flag transitioned.
    pub fn set(&mut self, flag: ProgressFlag, at: DateTime<Utc>) -> bool {
        let slot = match flag {
            ProgressFlag::ContentViewed => &mut self.content_viewed,
            ProgressFlag::ExplanationRead => &mut self.explanation_read,
            ProgressFlag::TaskPassed => &mut self.task_passed,
            ProgressFlag::ChallengeCompleted => &mut self.challenge_completed,
        };
        if slot.is_some() {
            false
        } else {
            *slot = Some(at);
            true
        }
    }

    /// Whether this progress completes a module of the given category.
    ///
    /// The tutorial only asks for a content view, the finale hinges on its
    /// closing challenge, and the regular tracks require all four flags.
    pub fn completes(&self, category: ModuleCategory) -> bool {
        match category {
            ModuleCategory::Tutorial => self.is_set(ProgressFlag::ContentViewed),
            ModuleCategory::Finale => self.is_set(ProgressFlag::ChallengeCompleted),
            ModuleCategory::Fixed { .. } | ModuleCategory::Flexible { .. } => {
                ProgressFlag::ALL.iter().all(|f| self.is_set(*f))
            }
        }
    }
}

/// One append-once ledger row: a reward collected by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedReward {
    pub module_id: String,
    pub reward_id: String,
    /// Copied from the catalog at collection time, never recomputed.
    pub xp_earned: u32,
    pub collected_at: DateTime<Utc>,
}

/// Cached per-user aggregate. `total_xp` must always equal the ledger sum;
/// `level` must always equal `level_for_xp(total_xp)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_xp: u32,
    pub level: u32,
    pub streak_days: u32,
    pub last_activity: Option<NaiveDate>,
}

/// Snapshot of recorded user state that reward conditions evaluate against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionState {
    pub goals_set: u32,
    pub goals_achieved: u32,
    pub streak_days: u32,
}

impl RewardCondition {
    /// Evaluate this condition against recorded user state.
    pub fn is_met(&self, state: &ConditionState) -> bool {
        match self {
            Self::FirstGoalSet => state.goals_set >= 1,
            Self::ThreeGoalsAchieved => state.goals_achieved >= 3,
            Self::SevenDayStreak => state.streak_days >= 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_is_first_wins() {
        let mut progress = ModuleProgress::default();
        let t1 = Utc::now();
        let t2 = t1 + chrono::Duration::hours(1);

        assert!(progress.set(ProgressFlag::ContentViewed, t1));
        assert!(!progress.set(ProgressFlag::ContentViewed, t2));
        assert_eq!(progress.flag_at(ProgressFlag::ContentViewed), Some(t1));
    }

    #[test]
    fn completion_rules_per_category() {
        let mut progress = ModuleProgress::default();
        progress.set(ProgressFlag::ContentViewed, Utc::now());

        assert!(progress.completes(ModuleCategory::Tutorial));
        assert!(!progress.completes(ModuleCategory::Fixed { position: 0 }));
        assert!(!progress.completes(ModuleCategory::Finale));

        for flag in ProgressFlag::ALL {
            progress.set(flag, Utc::now());
        }
        assert!(progress.completes(ModuleCategory::Fixed { position: 0 }));
        assert!(progress.completes(ModuleCategory::Flexible { position: 2 }));
        assert!(progress.completes(ModuleCategory::Finale));
    }

    #[test]
    fn conditions_evaluate_against_state() {
        let state = ConditionState { goals_set: 1, goals_achieved: 2, streak_days: 7 };
        assert!(RewardCondition::FirstGoalSet.is_met(&state));
        assert!(!RewardCondition::ThreeGoalsAchieved.is_met(&state));
        assert!(RewardCondition::SevenDayStreak.is_met(&state));
    }
}
