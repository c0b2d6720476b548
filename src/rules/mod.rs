//! Static rule data: dice tables, bosses, location events and titles.
//!
//! Rules are JSON. The built-in set is embedded at compile time; a directory
//! with the same file names can replace it. Everything is validated once at
//! load and then handed to the engine as an immutable [`RuleBook`].

pub mod data;
pub mod types;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use types::*;

use crate::world::{Player, PlayerClass};

/// Errors raised while loading or validating rule data.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("rule table must have exactly one default entry, found {found}")]
    DefaultEntryCount { found: usize },

    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("explore outcome weights must sum to more than zero")]
    ZeroOutcomeWeight,

    #[error("explore outcomes are missing {0:?}")]
    MissingOutcome(ExploreOutcome),

    #[error("{0} list is empty")]
    EmptyList(&'static str),

    #[error("duplicate {kind} id {id:?}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("title {title:?} requires unknown numeric field {field:?}")]
    UnknownTitleField { title: String, field: String },
}

/// Raw JSON documents for each rule file.
#[derive(Debug, Clone, Copy)]
pub struct RuleSources<'a> {
    pub gather: &'a str,
    pub explore: &'a str,
    pub attack_clan: &'a str,
    pub attack_monster: &'a str,
    pub bosses: &'a str,
    pub location_events: &'a str,
    pub titles: &'a str,
}

/// All rule data the engine needs, validated.
#[derive(Debug, Clone)]
pub struct RuleBook {
    pub gather: RuleTable<GatherRule>,
    pub explore: ExploreRules,
    pub clan_battle: ClanBattleRules,
    pub monster: RuleTable<MonsterRule>,
    pub bosses: Vec<BossRule>,
    pub location_events: Vec<LocationEventRule>,
    pub titles: Vec<TitleRule>,
}

fn parse<T: serde::de::DeserializeOwned>(file: &str, json: &str) -> Result<T, RulesError> {
    serde_json::from_str(json).map_err(|source| RulesError::Parse {
        file: file.to_string(),
        source,
    })
}

impl RuleBook {
    /// The rule set compiled into the binary.
    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_sources(data::BUILTIN)
    }

    /// Loads every rule file from `dir`, using the file names of
    /// [`data::FILE_NAMES`].
    pub fn from_dir(dir: &Path) -> Result<Self, RulesError> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| RulesError::Io { path, source })
        };
        let [gather, explore, attack_clan, attack_monster, bosses, location_events, titles] =
            data::FILE_NAMES;

        let gather = read(gather)?;
        let explore = read(explore)?;
        let attack_clan = read(attack_clan)?;
        let attack_monster = read(attack_monster)?;
        let bosses = read(bosses)?;
        let location_events = read(location_events)?;
        let titles = read(titles)?;

        tracing::info!(dir = %dir.display(), "loading rule overrides");
        Self::from_sources(RuleSources {
            gather: &gather,
            explore: &explore,
            attack_clan: &attack_clan,
            attack_monster: &attack_monster,
            bosses: &bosses,
            location_events: &location_events,
            titles: &titles,
        })
    }

    pub fn from_sources(sources: RuleSources<'_>) -> Result<Self, RulesError> {
        let [gather, explore, attack_clan, attack_monster, bosses, location_events, titles] =
            data::FILE_NAMES;

        let book = Self {
            gather: parse(gather, sources.gather)?,
            explore: parse(explore, sources.explore)?,
            clan_battle: parse(attack_clan, sources.attack_clan)?,
            monster: parse(attack_monster, sources.attack_monster)?,
            bosses: parse(bosses, sources.bosses)?,
            location_events: parse(location_events, sources.location_events)?,
            titles: parse(titles, sources.titles)?,
        };
        book.validate()?;
        Ok(book)
    }

    fn validate(&self) -> Result<(), RulesError> {
        if self.explore.total_weight() == 0 {
            return Err(RulesError::ZeroOutcomeWeight);
        }
        for outcome in [
            ExploreOutcome::Xp,
            ExploreOutcome::Wood,
            ExploreOutcome::Food,
            ExploreOutcome::Gold,
            ExploreOutcome::Trap,
        ] {
            if !self.explore.outcomes.iter().any(|o| o.outcome == outcome) {
                return Err(RulesError::MissingOutcome(outcome));
            }
        }

        if self.bosses.is_empty() {
            return Err(RulesError::EmptyList("boss"));
        }
        if self.location_events.is_empty() {
            return Err(RulesError::EmptyList("location event"));
        }
        unique_ids("boss", self.bosses.iter().map(|b| b.id.as_str()))?;
        unique_ids(
            "location event",
            self.location_events.iter().map(|e| e.id.as_str()),
        )?;
        unique_ids("title", self.titles.iter().map(|t| t.id.as_str()))?;

        // Title paths must name a number on the player record
        let probe = serde_json::to_value(Player::new("probe", "probe", PlayerClass::Adventurer))
            .map_err(|source| RulesError::Parse {
                file: "player schema".to_string(),
                source,
            })?;
        for title in &self.titles {
            let resolves = probe
                .pointer(&title.field_pointer())
                .is_some_and(serde_json::Value::is_number);
            if !resolves {
                return Err(RulesError::UnknownTitleField {
                    title: title.id.clone(),
                    field: title.requirement.field.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn boss(&self, boss_id: &str) -> Option<&BossRule> {
        self.bosses.iter().find(|b| b.id == boss_id)
    }
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), RulesError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(RulesError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
