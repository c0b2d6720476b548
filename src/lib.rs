//! Clanquest - a clan-based play-by-comment RPG.
//!
//! The library holds the deterministic daily tick and the thin adapters
//! around it: rule loading, persistence, thread ingestion, narration and
//! queries. The binary wires them together.

pub mod actions;
pub mod boss;
pub mod combat;
pub mod core;
pub mod ingestion;
pub mod modifiers;
pub mod narration;
pub mod queries;
pub mod rules;
pub mod titles;
pub mod utils;
pub mod world;

pub use crate::core::{tick, Dice, RandomDice, RecordingDice, ScriptedDice, TickEvent, TickResult};
pub use rules::{RuleBook, RulesError};
pub use world::{Action, ActionKind, Player, PlayerClass, Resource, WorldState};
