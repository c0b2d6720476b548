use super::{acting_clan, effects_at, reply, tagged};
use crate::core::constants::TRAP_LOSS_TABLE;
use crate::core::dice::Dice;
use crate::core::economy;
use crate::core::error::{ResolveError, Result};
use crate::core::progression::{grant_xp, scale};
use crate::rules::{BonusKind, ExploreOutcome, ExploreRules, RuleBook};
use crate::titles::{fortune_bonus, title_bonus};
use crate::world::{Action, Resource, WorldState};

/// Weighted draw: `roll mod total`, first outcome whose cumulative weight
/// exceeds it. Falls back to the first outcome.
pub fn select_outcome(rules: &ExploreRules, roll: i32) -> ExploreOutcome {
    let fallback = rules
        .outcomes
        .first()
        .map(|o| o.outcome)
        .unwrap_or(ExploreOutcome::Xp);
    let total = rules.total_weight();
    if total == 0 {
        return fallback;
    }

    let scaled = i64::from(roll).rem_euclid(i64::from(total));
    let mut cumulative = 0i64;
    for weighted in &rules.outcomes {
        cumulative += i64::from(weighted.weight);
        if cumulative > scaled {
            return weighted.outcome;
        }
    }
    fallback
}

/// EXPLORE a location, or the unclaimed wilds when no target is given.
///
/// Dice: fortune roll, outcome roll, trap resource roll (traps only),
/// message roll. Only the target's modifier applies, never the home one.
pub fn resolve_explore<D: Dice>(
    rules: &RuleBook,
    state: &mut WorldState,
    action: &Action,
    dice: &mut D,
) -> Result<String> {
    let clan_id = acting_clan(state, &action.player_id)?;

    let target = action.target.as_deref();
    if let Some(location_id) = target {
        if !state.locations.contains_key(location_id) {
            let message = format!("You search for {location_id}, but no such place exists.");
            return Ok(reply(state, &action.player_id, message));
        }
    }
    let effects = effects_at(state, target);

    let player = state
        .players
        .get_mut(&action.player_id)
        .ok_or_else(|| ResolveError::UnknownPlayer(action.player_id.clone()))?;
    let roll = dice
        .roll()
        .saturating_add(fortune_bonus(&rules.titles, player))
        .saturating_add(effects.fortune)
        .saturating_add(effects.explore);
    let outcome = select_outcome(&rules.explore, dice.roll());

    let (tag, messages) = match outcome {
        ExploreOutcome::Xp => {
            let rule = rules.explore.xp.lookup(roll);
            let xp = scale(rule.xp.unwrap_or(0), player.level)
                + title_bonus(&rules.titles, player, BonusKind::Xp);
            grant_xp(player, xp);
            (format!("[+{xp} xp]"), &rule.messages)
        }
        ExploreOutcome::Food | ExploreOutcome::Wood | ExploreOutcome::Gold => {
            let (resource, table) = match outcome {
                ExploreOutcome::Food => (Resource::Food, &rules.explore.food),
                ExploreOutcome::Wood => (Resource::Wood, &rules.explore.wood),
                _ => (Resource::Gold, &rules.explore.gold),
            };
            let rule = table.lookup(roll);
            let amount = scale(rule.amount.unwrap_or(0), player.level)
                + title_bonus(&rules.titles, player, BonusKind::from(resource));
            if let Some(clan) = state.clans.get_mut(&clan_id) {
                economy::gain(clan, resource, amount);
            }
            player.stats.accrue(resource, amount);
            (format!("[+{amount} {resource}]"), &rule.messages)
        }
        ExploreOutcome::Trap => {
            let resource = dice.pick(&TRAP_LOSS_TABLE).copied().unwrap_or(Resource::Food);
            let rule = rules.explore.trap.lookup(roll);
            match rule.xp {
                Some(xp) => {
                    let xp = scale(xp, player.level)
                        + title_bonus(&rules.titles, player, BonusKind::Xp);
                    grant_xp(player, xp);
                    (format!("[+{xp} xp]"), &rule.messages)
                }
                None => {
                    let loss = scale(rule.amount.unwrap_or(0), player.level);
                    let lost = state
                        .clans
                        .get_mut(&clan_id)
                        .map_or(0, |clan| economy::lose(clan, resource, loss));
                    (format!("[-{lost} {resource}]"), &rule.messages)
                }
            }
        }
    };

    player.stats.explore_count += 1;

    let flavor = dice.flavor(messages);
    let message = tagged(&flavor, &tag);
    player.push_message(message.clone());
    tracing::debug!(player = %player.id, roll, ?outcome, "explore resolved");
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::world::{
        Clan, Location, LocationModifier, ModifierEffects, ModifierKind, Player, PlayerClass,
        ResourceBundle,
    };

    fn world() -> WorldState {
        let mut state = WorldState {
            day: 1,
            ..Default::default()
        };
        for (clan, loc) in [("clanA", "locA"), ("clanB", "locB")] {
            state.clans.insert(
                clan.to_string(),
                Clan {
                    id: clan.to_string(),
                    name: clan.to_string(),
                    description: String::new(),
                    food: 100,
                    wood: 100,
                    gold: 100,
                    defeated_by: None,
                    daily_bonus: Some(ResourceBundle::default()),
                },
            );
            state.locations.insert(
                loc.to_string(),
                Location {
                    id: loc.to_string(),
                    name: loc.to_string(),
                    description: String::new(),
                    clan_id: Some(clan.to_string()),
                },
            );
        }
        state.players.insert(
            "p1".to_string(),
            Player::new("p1", "clanA", PlayerClass::Adventurer),
        );
        state
    }

    #[test]
    fn test_select_outcome_uses_cumulative_weights() {
        let rules = RuleBook::builtin().unwrap();
        // Five outcomes of weight 2, total 10
        assert_eq!(select_outcome(&rules.explore, 0), ExploreOutcome::Xp);
        assert_eq!(select_outcome(&rules.explore, 1), ExploreOutcome::Xp);
        assert_eq!(select_outcome(&rules.explore, 2), ExploreOutcome::Wood);
        assert_eq!(select_outcome(&rules.explore, 5), ExploreOutcome::Food);
        assert_eq!(select_outcome(&rules.explore, 7), ExploreOutcome::Gold);
        assert_eq!(select_outcome(&rules.explore, 9), ExploreOutcome::Trap);
        assert_eq!(select_outcome(&rules.explore, 12), ExploreOutcome::Wood);
    }

    #[test]
    fn test_explore_xp_outcome() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        // roll 10 -> default xp 5, outcome 0 -> xp
        let mut dice = ScriptedDice::new(vec![10, 0, 0]);
        resolve_explore(&rules, &mut state, &Action::explore("p1", "locB"), &mut dice).unwrap();
        let player = &state.players["p1"];
        assert_eq!(player.xp, 5);
        assert_eq!(player.stats.explore_count, 1);
        assert!(player.message_text().contains("[+5 xp]"));
        assert_eq!(dice.consumed(), 3);
    }

    #[test]
    fn test_explore_resource_outcome_feeds_clan() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        // roll 17 -> wood row min 16 = 10, outcome 2 -> wood
        let mut dice = ScriptedDice::new(vec![17, 2, 0]);
        resolve_explore(&rules, &mut state, &Action::explore("p1", "locB"), &mut dice).unwrap();
        assert_eq!(state.clans["clanA"].wood, 110);
        assert_eq!(state.players["p1"].stats.wood, 10);
    }

    #[test]
    fn test_trap_loses_scaled_amount() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        // roll 1 -> loss 15, outcome 9 -> trap, trap roll 2 -> wood
        let mut dice = ScriptedDice::new(vec![1, 9, 2, 0]);
        resolve_explore(&rules, &mut state, &Action::explore("p1", "locB"), &mut dice).unwrap();
        assert_eq!(state.clans["clanA"].wood, 85);
        assert!(state.players["p1"].message_text().contains("[-15 wood]"));
        assert_eq!(dice.consumed(), 4);
    }

    #[test]
    fn test_trap_loss_floors_at_zero() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        if let Some(clan) = state.clans.get_mut("clanA") {
            clan.gold = 4;
        }
        // trap roll 3 -> gold, default loss 5
        let mut dice = ScriptedDice::new(vec![10, 9, 3, 0]);
        resolve_explore(&rules, &mut state, &Action::explore("p1", "locB"), &mut dice).unwrap();
        assert_eq!(state.clans["clanA"].gold, 0);
    }

    #[test]
    fn test_trap_consolation_xp() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        let mut dice = ScriptedDice::new(vec![20, 9, 0, 0]);
        resolve_explore(&rules, &mut state, &Action::explore("p1", "locB"), &mut dice).unwrap();
        assert_eq!(state.players["p1"].xp, 2);
        assert_eq!(state.clans["clanA"].food, 100);
    }

    #[test]
    fn test_target_modifier_applies_not_home() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        let curse = |location: &str| LocationModifier {
            id: "fog".to_string(),
            kind: ModifierKind::Curse,
            location_id: location.to_string(),
            started_on: 1,
            effects: ModifierEffects {
                explore: -8,
                ..Default::default()
            },
            messages: Vec::new(),
        };

        // Home modifier is ignored: roll 10 stays default (xp 5)
        state.location_modifiers = vec![curse("locA")];
        let mut dice = ScriptedDice::new(vec![10, 0, 0]);
        resolve_explore(&rules, &mut state, &Action::explore("p1", "locB"), &mut dice).unwrap();
        assert_eq!(state.players["p1"].xp, 5);

        // Target modifier applies: 10 - 8 = 2 -> xp 0
        state.location_modifiers = vec![curse("locB")];
        let mut dice = ScriptedDice::new(vec![10, 0, 0]);
        resolve_explore(&rules, &mut state, &Action::explore("p1", "locB"), &mut dice).unwrap();
        assert_eq!(state.players["p1"].xp, 5);
    }

    #[test]
    fn test_unknown_target_is_a_message() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        let mut dice = ScriptedDice::new(vec![10]);
        resolve_explore(&rules, &mut state, &Action::explore("p1", "atlantis"), &mut dice)
            .unwrap();
        assert!(state.players["p1"].message_text().contains("no such place"));
        assert_eq!(state.players["p1"].stats.explore_count, 0);
        assert_eq!(dice.consumed(), 0);
    }

    #[test]
    fn test_wilds_without_target() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        let action = Action::new("p1", crate::world::ActionKind::Explore, None);
        let mut dice = ScriptedDice::new(vec![10, 0, 0]);
        resolve_explore(&rules, &mut state, &action, &mut dice).unwrap();
        assert_eq!(state.players["p1"].stats.explore_count, 1);
    }

    #[test]
    fn test_defeated_clan_explore_keeps_personal_total() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        if let Some(clan) = state.clans.get_mut("clanA") {
            clan.defeated_by = Some("clanB".to_string());
        }
        let mut dice = ScriptedDice::new(vec![17, 2, 0]);
        resolve_explore(&rules, &mut state, &Action::explore("p1", "locB"), &mut dice).unwrap();
        assert_eq!(state.clans["clanA"].wood, 100);
        let player = &state.players["p1"];
        assert_eq!(player.stats.wood, 10);
        assert!(player.message_text().contains("[+10 wood]"));
    }

    #[test]
    fn test_explore_unknown_player_is_an_error() {
        let rules = RuleBook::builtin().unwrap();
        let mut state = world();
        let mut dice = ScriptedDice::new(vec![10]);
        let action = Action::explore("ghost", "locB");
        let err = resolve_explore(&rules, &mut state, &action, &mut dice).unwrap_err();
        assert_eq!(err, ResolveError::UnknownPlayer("ghost".to_string()));
        assert_eq!(dice.consumed(), 0);
    }
}
