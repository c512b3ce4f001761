//! Module catalog: the static "treasure map" definition.
//!
//! Modules ("islands") are seeded once at process start and never change at
//! runtime. Each category carries its own unlock-threshold logic, so the
//! resolver can match exhaustively instead of interpreting loose dictionaries.

use serde::{Deserialize, Serialize};

use crate::{CoreError, Result};

/// Unique module key, e.g. `"festung"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Module category with per-variant unlock placement.
///
/// `position` is the 0-indexed slot within the respective track, not a week
/// number; the week threshold is derived from it (see `unlock_week`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleCategory {
    /// Onboarding island, open from day one.
    Tutorial,
    /// Weekly core track. Position 0 is open from day one.
    Fixed { position: u32 },
    /// Elective track, one island per week once the fixed track is done.
    Flexible { position: u32 },
    /// Closing island, gated behind the full program.
    Finale,
}

/// First week at which a flexible-track island opens.
pub const FLEXIBLE_START_WEEK: u32 = 5;

/// Week at which the finale island opens.
pub const FINALE_WEEK: u32 = 14;

impl ModuleCategory {
    /// The effective week at which a module of this category unlocks.
    ///
    /// Fixed position 0 shares the week-0 baseline with the tutorial; every
    /// later fixed island at position `p` opens at week `p + 1`.
    pub fn unlock_week(&self) -> u32 {
        match *self {
            Self::Tutorial | Self::Fixed { position: 0 } => 0,
            Self::Fixed { position } => position + 1,
            Self::Flexible { position } => FLEXIBLE_START_WEEK + position,
            Self::Finale => FINALE_WEEK,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tutorial => "tutorial",
            Self::Fixed { .. } => "fixed",
            Self::Flexible { .. } => "flexible",
            Self::Finale => "finale",
        }
    }
}

/// Closed set of predicates gating a reward beyond module unlock.
///
/// Conditions are an enum, not free-text tags: a typo'd tag would otherwise
/// silently never match. Each variant is evaluated against
/// [`crate::ConditionState`] queried from the progress store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardCondition {
    /// The user has set at least one personal goal.
    FirstGoalSet,
    /// The user has marked three goals as achieved.
    ThreeGoalsAchieved,
    /// The user holds an activity streak of seven days or more.
    SevenDayStreak,
}

impl RewardCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstGoalSet => "first_goal_set",
            Self::ThreeGoalsAchieved => "three_goals_achieved",
            Self::SevenDayStreak => "seven_day_streak",
        }
    }
}

impl std::str::FromStr for RewardCondition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first_goal_set" => Ok(Self::FirstGoalSet),
            "three_goals_achieved" => Ok(Self::ThreeGoalsAchieved),
            "seven_day_streak" => Ok(Self::SevenDayStreak),
            other => Err(CoreError::InvalidInput(format!(
                "unknown reward condition: {other}"
            ))),
        }
    }
}

/// A collectible reward ("treasure") tied to one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDef {
    /// Unique within the owning module.
    pub id: String,
    /// XP granted on collection; copied into the ledger at collect time.
    pub xp_value: u32,
    /// Optional extra predicate beyond module unlock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<RewardCondition>,
}

impl RewardDef {
    pub fn new(id: impl Into<String>, xp_value: u32) -> Self {
        Self { id: id.into(), xp_value, condition: None }
    }

    pub fn with_condition(mut self, condition: RewardCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A thematic content unit ("island") with unlock placement and rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub category: ModuleCategory,
    pub rewards: Vec<RewardDef>,
}

impl Module {
    pub fn new(id: impl Into<ModuleId>, category: ModuleCategory, rewards: Vec<RewardDef>) -> Self {
        Self { id: id.into(), category, rewards }
    }

    pub fn reward(&self, reward_id: &str) -> Option<&RewardDef> {
        self.rewards.iter().find(|r| r.id == reward_id)
    }
}

impl From<String> for ModuleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Validated, ordered module catalog. Declaration order is the canonical
/// map order used for status projection tie-breaks.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    modules: Vec<Module>,
}

// Deserialization funnels through `Catalog::new` so a hand-edited catalog
// file cannot bypass the structural invariants.
impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            modules: Vec<Module>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.modules).map_err(serde::de::Error::custom)
    }
}

impl Catalog {
    /// Build a catalog, validating the invariants the resolver relies on:
    /// globally unique module ids, per-module unique reward ids, contiguous
    /// track positions starting at 0, at most one tutorial and one finale.
    pub fn new(modules: Vec<Module>) -> Result<Self> {
        let mut seen_ids = std::collections::HashSet::new();
        let mut fixed_positions = Vec::new();
        let mut flexible_positions = Vec::new();
        let mut tutorials = 0usize;
        let mut finales = 0usize;

        for module in &modules {
            if !seen_ids.insert(module.id.clone()) {
                return Err(CoreError::InvalidInput(format!(
                    "duplicate module id: {}",
                    module.id
                )));
            }
            let mut reward_ids = std::collections::HashSet::new();
            for reward in &module.rewards {
                if !reward_ids.insert(reward.id.as_str()) {
                    return Err(CoreError::InvalidInput(format!(
                        "duplicate reward id {} in module {}",
                        reward.id, module.id
                    )));
                }
            }
            match module.category {
                ModuleCategory::Tutorial => tutorials += 1,
                ModuleCategory::Fixed { position } => fixed_positions.push(position),
                ModuleCategory::Flexible { position } => flexible_positions.push(position),
                ModuleCategory::Finale => finales += 1,
            }
        }

        if tutorials > 1 {
            return Err(CoreError::InvalidInput("more than one tutorial module".into()));
        }
        if finales > 1 {
            return Err(CoreError::InvalidInput("more than one finale module".into()));
        }
        Self::check_contiguous("fixed", &mut fixed_positions)?;
        Self::check_contiguous("flexible", &mut flexible_positions)?;

        Ok(Self { modules })
    }

    fn check_contiguous(track: &str, positions: &mut Vec<u32>) -> Result<()> {
        positions.sort_unstable();
        for (expected, actual) in positions.iter().enumerate() {
            if *actual != expected as u32 {
                return Err(CoreError::InvalidInput(format!(
                    "{track} track positions must be contiguous from 0, found {actual}"
                )));
            }
        }
        Ok(())
    }

    /// Modules in declaration (map) order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn get(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| &m.id == id)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The shipped 15-week program: one tutorial, four fixed islands,
    /// nine flexible islands, one finale.
    pub fn standard() -> Self {
        let modules = vec![
            Module::new("start", ModuleCategory::Tutorial, vec![RewardDef::new(
                "kompass", 10,
            )]),
            Module::new("festung", ModuleCategory::Fixed { position: 0 }, vec![
                RewardDef::new("schild", 50),
                RewardDef::new("fahne", 25).with_condition(RewardCondition::FirstGoalSet),
            ]),
            Module::new("werkzeuge", ModuleCategory::Fixed { position: 1 }, vec![
                RewardDef::new("hammer", 50),
            ]),
            Module::new("faeden", ModuleCategory::Fixed { position: 2 }, vec![
                RewardDef::new("spule", 50),
            ]),
            Module::new("bruecken", ModuleCategory::Fixed { position: 3 }, vec![
                RewardDef::new("seil", 50),
                RewardDef::new("laterne", 25).with_condition(RewardCondition::ThreeGoalsAchieved),
            ]),
            Module::new("stille_bucht", ModuleCategory::Flexible { position: 0 }, vec![
                RewardDef::new("muschel", 40),
            ]),
            Module::new("spiegel_see", ModuleCategory::Flexible { position: 1 }, vec![
                RewardDef::new("spiegel", 40),
            ]),
            Module::new("wald_der_worte", ModuleCategory::Flexible { position: 2 }, vec![
                RewardDef::new("feder", 40),
            ]),
            Module::new("nebel_tal", ModuleCategory::Flexible { position: 3 }, vec![
                RewardDef::new("fackel", 40),
            ]),
            Module::new("klippen_pfad", ModuleCategory::Flexible { position: 4 }, vec![
                RewardDef::new("steigeisen", 40),
            ]),
            Module::new("sternen_wiese", ModuleCategory::Flexible { position: 5 }, vec![
                RewardDef::new("fernrohr", 40),
            ]),
            Module::new("fluss_delta", ModuleCategory::Flexible { position: 6 }, vec![
                RewardDef::new("paddel", 40),
            ]),
            Module::new("vulkan_insel", ModuleCategory::Flexible { position: 7 }, vec![
                RewardDef::new("funke", 40).with_condition(RewardCondition::SevenDayStreak),
            ]),
            Module::new("gipfel_camp", ModuleCategory::Flexible { position: 8 }, vec![
                RewardDef::new("zelt", 40),
            ]),
            Module::new("meister_berg", ModuleCategory::Finale, vec![RewardDef::new(
                "krone", 100,
            )]),
        ];
        Self::new(modules).expect("standard catalog is valid")
    }
}
