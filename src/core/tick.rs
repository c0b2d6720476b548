//! The daily tick: the central state transition of the world.
//!
//! [`tick()`] takes the previous snapshot, the day's intents and a dice
//! source, and returns the next snapshot together with a [`TickResult`]
//! describing what happened. It performs no I/O; persistence, narration
//! and comment posting are the caller's concern.

use std::collections::BTreeMap;

use super::dice::Dice;
use super::economy::apply_daily_bonuses;
use super::error::ResolveError;
use crate::actions::{resolve_explore, resolve_gather, resolve_wait};
use crate::boss::{resolve_boss, try_spawn_boss, BossOutcome};
use crate::combat::{resolve_clan_attack, resolve_monster_attack};
use crate::core::constants::MONSTER_LAIR_ID;
use crate::modifiers::{apply_resource_losses, try_spawn_modifier};
use crate::rules::RuleBook;
use crate::titles::grant_titles;
use crate::world::{Action, ActionKind, HistoryEntry, Location, PlayerId, WorldState};

/// A single event produced by a tick, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEvent {
    // ── Actions ─────────────────────────────────────────────────
    /// An action ran. `summary` is the feedback line sent to the player.
    ActionResolved {
        player_id: PlayerId,
        kind: ActionKind,
        summary: String,
    },

    /// An action could not run and was dropped.
    ActionSkipped { player_id: PlayerId, reason: String },

    // ── Bosses ──────────────────────────────────────────────────
    BossAppeared { boss_id: String },

    BossDefeated {
        boss_id: String,
        participants: Vec<PlayerId>,
    },

    /// The party fell short but the boss remains.
    BossRepelled { boss_id: String },

    /// The boss left after its last day.
    BossEscaped { boss_id: String },

    // ── World ───────────────────────────────────────────────────
    ModifierSpawned {
        modifier_id: String,
        location_id: String,
    },

    TitleUnlocked { player_id: PlayerId, title: String },
}

/// Result of processing one day.
#[derive(Debug, Clone)]
pub struct TickResult {
    /// The next world snapshot.
    pub state: WorldState,

    /// Plain one-paragraph recap of the day.
    pub narrative_summary: String,

    /// Events produced during this tick, in chronological order.
    pub events: Vec<TickEvent>,
}

/// Resolution order of action categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Category {
    Gather,
    Explore,
    AttackClan,
    AttackMonster,
    Wait,
}

const CATEGORY_ORDER: [Category; 5] = [
    Category::Gather,
    Category::Explore,
    Category::AttackClan,
    Category::AttackMonster,
    Category::Wait,
];

fn category_of(state: &WorldState, action: &Action) -> Category {
    match action.kind {
        ActionKind::Gather => Category::Gather,
        ActionKind::Explore => Category::Explore,
        ActionKind::Wait => Category::Wait,
        ActionKind::Attack => {
            let at_lair = action
                .target
                .as_deref()
                .and_then(|id| state.locations.get(id))
                .is_some_and(Location::is_monster_lair);
            if at_lair {
                Category::AttackMonster
            } else {
                Category::AttackClan
            }
        }
    }
}

/// Keeps one action per player: the last one submitted, at the position it
/// was submitted.
pub fn dedupe_actions(actions: &[Action]) -> Vec<Action> {
    let mut last_index: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, action) in actions.iter().enumerate() {
        last_index.insert(action.player_id.as_str(), i);
    }
    actions
        .iter()
        .enumerate()
        .filter(|(i, a)| last_index.get(a.player_id.as_str()) == Some(i))
        .map(|(_, a)| a.clone())
        .collect()
}

/// The location explored by the most players today. Ties go to the
/// smallest location id. Explores of the wilds or of unknown places do not
/// count.
pub fn most_explored_target(state: &WorldState, actions: &[Action]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for action in actions {
        if action.kind != ActionKind::Explore || !state.players.contains_key(&action.player_id) {
            continue;
        }
        if let Some(target) = action.target.as_deref() {
            if state.locations.contains_key(target) {
                *counts.entry(target).or_default() += 1;
            }
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (id, n)| match best {
            Some((_, top)) if top >= n => best,
            _ => Some((id, n)),
        })
        .map(|(id, _)| id.to_string())
}

/// Processes one simulated day.
///
/// The previous snapshot is never modified. Order of resolution:
/// 1. Advance the day and clear every message buffer
/// 2. Deduplicate intents (last one per player wins)
/// 3. Gather, explore, clan attacks, monster attacks, waits
/// 4. Drain resources under active modifiers
/// 5. Settle the active boss
/// 6. Grant titles
/// 7. Spawn a boss (lair was the most explored place) or a modifier
/// 8. Pay daily clan bonuses
/// 9. Record player history
///
/// Every random decision goes through `dice`, so a recorded roll sequence
/// replays the tick exactly.
pub fn tick<D: Dice>(
    rules: &RuleBook,
    previous: &WorldState,
    actions: &[Action],
    dice: &mut D,
) -> TickResult {
    let mut state = previous.clone();
    let mut events = Vec::new();

    // ── 1. New day ──────────────────────────────────────────────
    state.day += 1;
    for player in state.players.values_mut() {
        player.messages.clear();
    }
    let _span = tracing::info_span!("tick", day = state.day).entered();

    // ── 2. One action per player ────────────────────────────────
    let actions = dedupe_actions(actions);

    // ── 3. Resolve actions by category ──────────────────────────
    let categorized: Vec<(Category, &Action)> = actions
        .iter()
        .map(|a| (category_of(&state, a), a))
        .collect();
    let mut history: Vec<(PlayerId, HistoryEntry)> = Vec::new();

    for category in CATEGORY_ORDER {
        for action in categorized
            .iter()
            .filter(|(c, _)| *c == category)
            .map(|(_, a)| *a)
        {
            let outcome = match category {
                Category::Gather => resolve_gather(rules, &mut state, action, dice),
                Category::Explore => resolve_explore(rules, &mut state, action, dice),
                Category::AttackClan => resolve_clan_attack(rules, &mut state, action, dice),
                Category::AttackMonster => {
                    resolve_monster_attack(rules, &mut state, action, dice)
                }
                Category::Wait => resolve_wait(&mut state, action),
            };

            match outcome {
                Ok(summary) => {
                    let day = state.day;
                    if let Some(player) = state.players.get_mut(&action.player_id) {
                        player.stats.last_action_day = day;
                    }
                    history.push((
                        action.player_id.clone(),
                        HistoryEntry {
                            day,
                            action: action.kind,
                            target: action.target.clone(),
                            summary: summary.clone(),
                        },
                    ));
                    events.push(TickEvent::ActionResolved {
                        player_id: action.player_id.clone(),
                        kind: action.kind,
                        summary,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        player = %action.player_id,
                        kind = action.kind.name(),
                        error = %e,
                        "action skipped"
                    );
                    events.push(TickEvent::ActionSkipped {
                        player_id: action.player_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    // ── 4. Modifier drains ──────────────────────────────────────
    apply_resource_losses(&mut state);

    // ── 5. Boss resolution ──────────────────────────────────────
    match resolve_boss(rules, &mut state, dice) {
        Ok(Some(BossOutcome::Defeated {
            boss_id,
            participants,
        })) => events.push(TickEvent::BossDefeated {
            boss_id,
            participants,
        }),
        Ok(Some(BossOutcome::Repelled { boss_id })) => {
            events.push(TickEvent::BossRepelled { boss_id })
        }
        Ok(Some(BossOutcome::Escaped { boss_id })) => {
            events.push(TickEvent::BossEscaped { boss_id })
        }
        Ok(None) => {}
        Err(e @ ResolveError::UnknownBoss(_)) => {
            tracing::warn!(error = %e, "dropping boss without a rule");
            state.active_boss = None;
        }
        Err(e) => tracing::warn!(error = %e, "boss resolution failed"),
    }

    // ── 6. Titles ───────────────────────────────────────────────
    for player in state.players.values_mut() {
        for title in grant_titles(&rules.titles, player) {
            events.push(TickEvent::TitleUnlocked {
                player_id: player.id.clone(),
                title,
            });
        }
    }

    // ── 7. Boss or modifier spawn ───────────────────────────────
    let most_explored = most_explored_target(&state, &actions);
    if most_explored.as_deref() == Some(MONSTER_LAIR_ID) {
        state.location_modifiers.clear();
        if let Some(boss_id) = try_spawn_boss(rules, &mut state, dice) {
            events.push(TickEvent::BossAppeared { boss_id });
        }
    } else if let Some(modifier_id) =
        try_spawn_modifier(rules, &mut state, most_explored.as_deref(), dice)
    {
        let location_id = state
            .location_modifiers
            .first()
            .map(|m| m.location_id.clone())
            .unwrap_or_default();
        events.push(TickEvent::ModifierSpawned {
            modifier_id,
            location_id,
        });
    }

    // ── 8. Daily clan bonuses ───────────────────────────────────
    apply_daily_bonuses(&mut state, dice);

    // ── 9. History ──────────────────────────────────────────────
    for (player_id, entry) in history {
        if let Some(player) = state.players.get_mut(&player_id) {
            player.record_history(entry);
        }
    }

    let narrative_summary = summarize(&state, &events);
    tracing::info!(
        actions = actions.len(),
        events = events.len(),
        "tick complete"
    );
    TickResult {
        state,
        narrative_summary,
        events,
    }
}

/// One paragraph recap built from the tick's events and today's world log.
fn summarize(state: &WorldState, events: &[TickEvent]) -> String {
    let acted = events
        .iter()
        .filter(|e| matches!(e, TickEvent::ActionResolved { .. }))
        .count();

    let mut lines = vec![format!("Day {} has ended.", state.day)];
    lines.push(match acted {
        0 => "No one acted today.".to_string(),
        1 => "One adventurer acted today.".to_string(),
        n => format!("{n} adventurers acted today."),
    });
    for event in state.events_on(state.day) {
        if !event.data.message.is_empty() {
            lines.push(event.data.message.clone());
        }
    }
    lines.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Resource;

    #[test]
    fn test_dedupe_keeps_last_action_per_player() {
        let actions = vec![
            Action::gather("p1", Resource::Food),
            Action::wait("p2"),
            Action::gather("p1", Resource::Gold),
        ];
        let deduped = dedupe_actions(&actions);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].player_id, "p2");
        assert_eq!(deduped[1].target.as_deref(), Some("gold"));
    }

    #[test]
    fn test_most_explored_ignores_unknown_and_breaks_ties_by_id() {
        let mut state = WorldState::default();
        for id in ["locA", "locB"] {
            state.locations.insert(
                id.to_string(),
                crate::world::Location {
                    id: id.to_string(),
                    name: id.to_string(),
                    description: String::new(),
                    clan_id: None,
                },
            );
        }
        for id in ["p1", "p2", "p3"] {
            state.players.insert(
                id.to_string(),
                crate::world::Player::new(id, "c", crate::world::PlayerClass::Monk),
            );
        }
        let actions = vec![
            Action::explore("p1", "locB"),
            Action::explore("p2", "locA"),
            Action::explore("p3", "nowhere"),
        ];
        assert_eq!(most_explored_target(&state, &actions).as_deref(), Some("locA"));
        assert_eq!(most_explored_target(&state, &[]), None);
    }

    #[test]
    fn test_attack_on_unowned_location_is_monster_fight() {
        let state = WorldState::initial();
        assert_eq!(
            category_of(&state, &Action::attack("p", MONSTER_LAIR_ID)),
            Category::AttackMonster
        );
        assert_eq!(
            category_of(&state, &Action::attack("p", "red_base")),
            Category::AttackClan
        );
        assert_eq!(
            category_of(&state, &Action::attack("p", "atlantis")),
            Category::AttackClan
        );
    }
}
