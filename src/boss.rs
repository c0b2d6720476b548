//! World boss lifecycle.
//!
//! At most one boss is active. It appears when the monster lair was the most
//! explored place of the day, then each tick the players who attacked it are
//! weighed against its requirements. A failed attempt sends everyone home
//! with a little xp and the boss waits for a new party until it expires.

use crate::actions::tagged;
use crate::core::constants::BOSS_SPAWN_THRESHOLD;
use crate::core::dice::Dice;
use crate::core::error::{ResolveError, Result};
use crate::core::progression::{grant_xp, scale};
use crate::rules::{BonusKind, BossRule, RuleBook};
use crate::titles::title_bonus;
use crate::world::{BossState, Player, WorldEvent, WorldEventData, WorldEventKind, WorldState};

/// How a boss resolution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BossOutcome {
    Defeated {
        boss_id: String,
        participants: Vec<String>,
    },
    /// The party fell short; the boss stays for another day.
    Repelled { boss_id: String },
    /// The party fell short on the last day; the boss is gone.
    Escaped { boss_id: String },
}

/// Whether a party satisfies a boss's headcount and class requirements.
pub fn requirements_met(rule: &BossRule, party: &[&Player]) -> bool {
    if (party.len() as u32) < rule.min_participants {
        return false;
    }
    rule.requirements.iter().all(|(class, needed)| {
        party.iter().filter(|p| p.class == *class).count() as u32 >= *needed
    })
}

fn push_event(
    state: &mut WorldState,
    kind: WorldEventKind,
    boss: &BossState,
    rule: &BossRule,
    message: String,
) {
    let id = state.next_event_id("boss");
    let location = Some(state.location_name(&boss.location_id));
    state.events.push(WorldEvent {
        id,
        kind,
        day: state.day,
        location,
        data: WorldEventData {
            boss_id: Some(rule.id.clone()),
            boss_name: Some(rule.name.clone()),
            message,
            ..Default::default()
        },
    });
}

/// Settles the active boss, if any. Dice: one message roll.
pub fn resolve_boss<D: Dice>(
    rules: &RuleBook,
    state: &mut WorldState,
    dice: &mut D,
) -> Result<Option<BossOutcome>> {
    let Some(boss) = state.active_boss.clone() else {
        return Ok(None);
    };
    let rule = rules
        .boss(&boss.boss_id)
        .ok_or_else(|| ResolveError::UnknownBoss(boss.boss_id.clone()))?;

    let party: Vec<&Player> = boss
        .participants
        .iter()
        .filter_map(|id| state.players.get(id))
        .collect();
    let success = requirements_met(rule, &party);

    let (flavor, base_xp) = if success {
        (dice.flavor(&rule.messages.success), rule.reward_xp)
    } else {
        (dice.flavor(&rule.messages.failure), rule.failure_xp)
    };

    for id in &boss.participants {
        let Some(player) = state.players.get_mut(id) else {
            continue;
        };
        let xp = scale(base_xp, player.level) + title_bonus(&rules.titles, player, BonusKind::Xp);
        player.push_message(tagged(&flavor, &format!("[+{xp} xp]")));
        grant_xp(player, xp);
        if success {
            player.stats.monster_killed += 1;
            player.stats.boss_killed += 1;
        }
    }

    if success {
        push_event(state, WorldEventKind::BossDefeated, &boss, rule, flavor);
        state.active_boss = None;
        tracing::info!(boss = %rule.id, party = boss.participants.len(), "boss defeated");
        return Ok(Some(BossOutcome::Defeated {
            boss_id: rule.id.clone(),
            participants: boss.participants,
        }));
    }

    if let Some(active) = state.active_boss.as_mut() {
        active.participants.clear();
    }
    if state.day >= boss.expires_on {
        let message = rule
            .messages
            .expire
            .first()
            .cloned()
            .unwrap_or_else(|| format!("{} has disappeared.", rule.name));
        push_event(state, WorldEventKind::BossDisappeared, &boss, rule, message);
        state.active_boss = None;
        tracing::info!(boss = %rule.id, "boss escaped");
        return Ok(Some(BossOutcome::Escaped {
            boss_id: rule.id.clone(),
        }));
    }

    tracing::debug!(boss = %rule.id, party = boss.participants.len(), "boss repelled the party");
    Ok(Some(BossOutcome::Repelled {
        boss_id: rule.id.clone(),
    }))
}

/// Rolls for a new boss while none is active. Dice: spawn roll, then a boss
/// pick when the spawn roll clears the threshold.
/// Returns the id of the boss that appeared.
pub fn try_spawn_boss<D: Dice>(
    rules: &RuleBook,
    state: &mut WorldState,
    dice: &mut D,
) -> Option<String> {
    if state.active_boss.is_some() {
        return None;
    }
    let roll = dice.roll();
    if roll <= BOSS_SPAWN_THRESHOLD {
        tracing::debug!(roll, "no boss today");
        return None;
    }
    let rule = dice.pick(&rules.bosses)?;

    let boss = BossState {
        boss_id: rule.id.clone(),
        location_id: rule.location_id.clone(),
        appeared_on: state.day,
        expires_on: state.day + rule.duration_days,
        participants: Vec::new(),
    };
    let message = rule
        .messages
        .appear
        .first()
        .cloned()
        .unwrap_or_else(|| format!("{} has appeared!", rule.name));
    push_event(state, WorldEventKind::BossAppeared, &boss, rule, message);
    state.active_boss = Some(boss);
    tracing::info!(boss = %rule.id, roll, "boss appeared");
    Some(rule.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::MONSTER_LAIR_ID;
    use crate::core::dice::ScriptedDice;
    use crate::world::PlayerClass;

    fn world_with_boss(boss_id: &str, expires_on: u32, party: &[(&str, PlayerClass)]) -> WorldState {
        let mut state = WorldState {
            day: 2,
            ..Default::default()
        };
        for (id, class) in party {
            state
                .players
                .insert(id.to_string(), Player::new(*id, "clanA", *class));
        }
        state.active_boss = Some(BossState {
            boss_id: boss_id.to_string(),
            location_id: MONSTER_LAIR_ID.to_string(),
            appeared_on: 1,
            expires_on,
            participants: party.iter().map(|(id, _)| id.to_string()).collect(),
        });
        state
    }

    #[test]
    fn test_requirements_need_headcount_and_classes() {
        let rules = RuleBook::builtin().unwrap();
        let eagle = rules.boss("great_eagle").unwrap();
        let archers: Vec<Player> = (0..5)
            .map(|i| Player::new(format!("a{i}"), "c", PlayerClass::Archer))
            .collect();
        let party: Vec<&Player> = archers.iter().collect();
        assert!(requirements_met(eagle, &party));
        assert!(!requirements_met(eagle, &party[..4]));

        let monks: Vec<Player> = (0..5)
            .map(|i| Player::new(format!("m{i}"), "c", PlayerClass::Monk))
            .collect();
        let party: Vec<&Player> = monks.iter().collect();
        assert!(!requirements_met(eagle, &party));
    }

    #[test]
    fn test_defeat_rewards_every_participant() {
        let rules = RuleBook::builtin().unwrap();
        let party: Vec<(String, PlayerClass)> =
            (1..=5).map(|i| (i.to_string(), PlayerClass::Archer)).collect();
        let party: Vec<(&str, PlayerClass)> =
            party.iter().map(|(id, c)| (id.as_str(), *c)).collect();
        let mut state = world_with_boss("great_eagle", 3, &party);
        let mut dice = ScriptedDice::new(vec![0]);

        let outcome = resolve_boss(&rules, &mut state, &mut dice).unwrap();

        assert!(matches!(outcome, Some(BossOutcome::Defeated { .. })));
        assert!(state.active_boss.is_none());
        let p1 = &state.players["1"];
        assert_eq!(p1.level, 2);
        assert_eq!(p1.xp, 12);
        assert_eq!(p1.stats.boss_killed, 1);
        assert!(p1.message_text().contains("Defeated The Great Eagle"));
        assert!(state
            .events
            .iter()
            .any(|e| e.kind == WorldEventKind::BossDefeated));
        assert_eq!(dice.consumed(), 1);
    }

    #[test]
    fn test_failure_clears_party_but_boss_stays() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world_with_boss("iron_behemoth", 4, &[("1", PlayerClass::Warrior)]);
        let mut dice = ScriptedDice::new(vec![0]);

        let outcome = resolve_boss(&rules, &mut state, &mut dice).unwrap();

        assert!(matches!(outcome, Some(BossOutcome::Repelled { .. })));
        let boss = state.active_boss.as_ref().unwrap();
        assert!(boss.participants.is_empty());
        let p1 = &state.players["1"];
        assert_eq!(p1.xp, 3);
        assert!(p1.message_text().contains("try attacking with more allies"));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_failure_on_last_day_escapes() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world_with_boss("iron_behemoth", 2, &[("1", PlayerClass::Warrior)]);
        let mut dice = ScriptedDice::new(vec![0]);

        let outcome = resolve_boss(&rules, &mut state, &mut dice).unwrap();

        assert!(matches!(outcome, Some(BossOutcome::Escaped { .. })));
        assert!(state.active_boss.is_none());
        assert_eq!(state.events[0].kind, WorldEventKind::BossDisappeared);
        assert!(state.players["1"].xp > 0);
    }

    #[test]
    fn test_unknown_boss_is_an_error() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world_with_boss("kraken", 4, &[]);
        let mut dice = ScriptedDice::default();
        let err = resolve_boss(&rules, &mut state, &mut dice).unwrap_err();
        assert_eq!(err, ResolveError::UnknownBoss("kraken".to_string()));
    }

    #[test]
    fn test_spawn_needs_roll_above_threshold() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = WorldState {
            day: 2,
            ..Default::default()
        };

        let mut dice = ScriptedDice::new(vec![BOSS_SPAWN_THRESHOLD]);
        assert_eq!(try_spawn_boss(&rules, &mut state, &mut dice), None);
        assert_eq!(dice.consumed(), 1);

        let mut dice = ScriptedDice::new(vec![20, 0]);
        let spawned = try_spawn_boss(&rules, &mut state, &mut dice);
        assert_eq!(spawned.as_deref(), Some(rules.bosses[0].id.as_str()));
        let boss = state.active_boss.as_ref().unwrap();
        assert_eq!(boss.appeared_on, 2);
        assert_eq!(boss.expires_on, 2 + rules.bosses[0].duration_days);
        assert_eq!(state.events[0].kind, WorldEventKind::BossAppeared);
        assert_eq!(
            state.events[0].data.boss_id.as_deref(),
            Some(rules.bosses[0].id.as_str())
        );
    }

    #[test]
    fn test_no_spawn_while_active() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world_with_boss("great_eagle", 5, &[]);
        let mut dice = ScriptedDice::new(vec![20, 1]);
        assert_eq!(try_spawn_boss(&rules, &mut state, &mut dice), None);
        assert_eq!(state.active_boss.as_ref().unwrap().boss_id, "great_eagle");
        assert_eq!(dice.consumed(), 0);
    }
}
