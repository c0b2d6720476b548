//! Rule table types.
//!
//! Every dice-keyed table is an ordered list of gated entries plus exactly one
//! gateless default. The default is checked when the table is built, so a
//! lookup always resolves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::RulesError;
use crate::world::{ModifierEffects, ModifierKind, PlayerClass};

/// Inclusive roll bounds. A missing bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiceRange {
    #[serde(default)]
    pub min: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
}

impl DiceRange {
    pub fn contains(&self, roll: i32) -> bool {
        self.min.map_or(true, |min| roll >= min) && self.max.map_or(true, |max| roll <= max)
    }

    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// One row of a rule table as written in JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry<T> {
    #[serde(default, alias = "dice_diff")]
    pub dice: Option<DiceRange>,
    #[serde(flatten)]
    pub outcome: T,
}

/// Ordered range-match table with a mandatory fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Vec<RuleEntry<T>>")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct RuleTable<T> {
    gated: Vec<(DiceRange, T)>,
    fallback: T,
}

impl<T> RuleTable<T> {
    /// First gated entry containing `roll`, else the default entry.
    pub fn lookup(&self, roll: i32) -> &T {
        self.gated
            .iter()
            .find(|(range, _)| range.contains(roll))
            .map(|(_, outcome)| outcome)
            .unwrap_or(&self.fallback)
    }
}

impl<T> TryFrom<Vec<RuleEntry<T>>> for RuleTable<T> {
    type Error = RulesError;

    fn try_from(entries: Vec<RuleEntry<T>>) -> Result<Self, Self::Error> {
        let defaults = entries
            .iter()
            .filter(|e| e.dice.map_or(true, |d| d.is_open()))
            .count();
        if defaults != 1 {
            return Err(RulesError::DefaultEntryCount { found: defaults });
        }

        let mut gated = Vec::with_capacity(entries.len() - 1);
        let mut fallback = None;
        for entry in entries {
            match entry.dice {
                Some(range) if !range.is_open() => gated.push((range, entry.outcome)),
                _ => fallback = Some(entry.outcome),
            }
        }

        let fallback = fallback.ok_or(RulesError::DefaultEntryCount { found: 0 })?;
        Ok(Self { gated, fallback })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatherRule {
    pub reward: u32,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Exploration sub-result. Trap rows carry either `xp` (consolation) or
/// `amount` (loss).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolutionRule {
    #[serde(default, alias = "reward")]
    pub amount: Option<u32>,
    #[serde(default)]
    pub xp: Option<u32>,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExploreOutcome {
    Xp,
    Wood,
    Food,
    Gold,
    Trap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WeightedOutcome {
    #[serde(rename = "type")]
    pub outcome: ExploreOutcome,
    pub weight: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExploreRules {
    pub outcomes: Vec<WeightedOutcome>,
    pub xp: RuleTable<ResolutionRule>,
    pub food: RuleTable<ResolutionRule>,
    pub wood: RuleTable<ResolutionRule>,
    pub gold: RuleTable<ResolutionRule>,
    pub trap: RuleTable<ResolutionRule>,
}

impl ExploreRules {
    pub fn total_weight(&self) -> u32 {
        self.outcomes.iter().map(|o| o.weight).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClanBattleRule {
    #[serde(default)]
    pub food_steal: u32,
    #[serde(default)]
    pub wood_shield: u32,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Win and lose tables, both keyed by `attacker roll - defender roll`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClanBattleRules {
    pub win: RuleTable<ClanBattleRule>,
    pub lose: RuleTable<ClanBattleRule>,
    /// Broadcast when a clan falls. `{clan}` is replaced by its name.
    #[serde(default)]
    pub destruction: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonsterRule {
    pub xp: u32,
    #[serde(default)]
    pub kill: bool,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct BossMessages {
    pub appear: Vec<String>,
    pub success: Vec<String>,
    pub failure: Vec<String>,
    pub expire: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BossRule {
    pub id: String,
    pub name: String,
    pub location_id: String,
    pub duration_days: u32,
    pub min_participants: u32,
    /// Minimum participants per class.
    #[serde(default)]
    pub requirements: BTreeMap<PlayerClass, u32>,
    pub reward_xp: u32,
    pub failure_xp: u32,
    #[serde(default)]
    pub messages: BossMessages,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationEventRule {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ModifierKind,
    #[serde(default)]
    pub effects: ModifierEffects,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Comparison {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = ">")]
    Above,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "<")]
    Below,
}

impl Comparison {
    pub fn holds(&self, actual: f64, threshold: f64) -> bool {
        match self {
            Comparison::AtLeast => actual >= threshold,
            Comparison::Above => actual > threshold,
            Comparison::Equal => (actual - threshold).abs() < f64::EPSILON,
            Comparison::AtMost => actual <= threshold,
            Comparison::Below => actual < threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TitleRequirement {
    /// Dotted path into the player record, e.g. `stats.monster_killed`.
    pub field: String,
    pub op: Comparison,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BonusKind {
    Xp,
    Food,
    Wood,
    Gold,
    Fortune,
}

impl From<crate::world::Resource> for BonusKind {
    fn from(resource: crate::world::Resource) -> Self {
        match resource {
            crate::world::Resource::Food => BonusKind::Food,
            crate::world::Resource::Wood => BonusKind::Wood,
            crate::world::Resource::Gold => BonusKind::Gold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TitleBonus {
    pub xp: u32,
    pub food: u32,
    pub wood: u32,
    pub gold: u32,
    pub fortune: u32,
}

impl TitleBonus {
    pub fn get(&self, kind: BonusKind) -> u32 {
        match kind {
            BonusKind::Xp => self.xp,
            BonusKind::Food => self.food,
            BonusKind::Wood => self.wood,
            BonusKind::Gold => self.gold,
            BonusKind::Fortune => self.fortune,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TitleRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub requirement: TitleRequirement,
    #[serde(default)]
    pub bonus: TitleBonus,
}

impl TitleRule {
    /// JSON pointer form of the requirement path.
    pub fn field_pointer(&self) -> String {
        format!("/{}", self.requirement.field.replace('.', "/"))
    }
}
