//! Clan raids.
//!
//! A raid costs the attacker's clan gold up front, pits the attacker against
//! one random member of the defending clan and, on a win, steals food. Wood
//! in the defender's stores absorbs part of the theft. A clan whose food hits
//! zero in a raid falls to the attacker's clan for good.

use super::advantage_bonus;
use crate::actions::{acting_clan, effects_at, reply, tagged};
use crate::core::constants::ATTACK_GOLD_COST;
use crate::core::dice::Dice;
use crate::core::economy;
use crate::core::error::{ResolveError, Result};
use crate::core::progression::scale;
use crate::rules::RuleBook;
use crate::titles::fortune_bonus;
use crate::world::{
    Action, ClanId, LocationId, PlayerClass, Resource, WorldEvent, WorldEventData, WorldEventKind,
    WorldState,
};

/// A clan that passed every raid precondition.
struct RaidTarget {
    clan_id: ClanId,
    clan_name: String,
    location_id: LocationId,
}

/// Checks raid preconditions in order. `Err` carries the player feedback.
fn find_target(
    state: &WorldState,
    target: Option<&str>,
    attacker_clan: &str,
) -> std::result::Result<RaidTarget, String> {
    let Some(location_id) = target else {
        return Err("You must name a location to attack.".to_string());
    };
    let Some(location) = state.locations.get(location_id) else {
        return Err(format!("There is no place called {location_id} to attack."));
    };
    let Some(clan) = location
        .clan_id
        .as_deref()
        .and_then(|id| state.clans.get(id))
    else {
        return Err(format!("No clan holds {} to attack.", location.name));
    };
    if clan.is_defeated() {
        return Err(format!("{} has already fallen.", clan.name));
    }
    if clan.food == 0 {
        return Err(format!("{} has no food left to take.", clan.name));
    }
    if clan.id == attacker_clan {
        return Err("You cannot attack your own clan.".to_string());
    }
    Ok(RaidTarget {
        clan_id: clan.id.clone(),
        clan_name: clan.name.clone(),
        location_id: location.id.clone(),
    })
}

/// ATTACK a clan's home location.
///
/// Dice: defender pick (only when the clan has members), attacker roll,
/// defender roll, outcome message roll, destruction message roll (only when
/// the defender falls).
pub fn resolve_clan_attack<D: Dice>(
    rules: &RuleBook,
    state: &mut WorldState,
    action: &Action,
    dice: &mut D,
) -> Result<String> {
    let attacker_clan = acting_clan(state, &action.player_id)?;
    let attacker = state
        .players
        .get(&action.player_id)
        .ok_or_else(|| ResolveError::UnknownPlayer(action.player_id.clone()))?;
    let attacker_class = attacker.class;
    let attacker_level = attacker.level;
    let attacker_name = attacker.name.clone();
    let attacker_fortune = fortune_bonus(&rules.titles, attacker);

    let target = match find_target(state, action.target.as_deref(), &attacker_clan) {
        Ok(target) => target,
        Err(message) => return Ok(reply(state, &action.player_id, message)),
    };

    let paid = state
        .clans
        .get_mut(&attacker_clan)
        .filter(|clan| clan.gold >= ATTACK_GOLD_COST)
        .map(|clan| economy::lose(clan, Resource::Gold, ATTACK_GOLD_COST))
        .is_some();
    if !paid {
        let message = format!(
            "Your clan lacks the gold to fund an attack ({ATTACK_GOLD_COST} gold needed)."
        );
        return Ok(reply(state, &action.player_id, message));
    }

    // Defender: a random member, or an empty-handed level 0 stand-in
    let members = state.members_of(&target.clan_id);
    let defender_id = dice.pick(&members).cloned();
    let (defender_class, defender_fortune) = defender_id
        .as_deref()
        .and_then(|id| state.players.get(id))
        .map(|p| (p.class, fortune_bonus(&rules.titles, p)))
        .unwrap_or((PlayerClass::Adventurer, 0));
    let home_fortune = effects_at(state, Some(&target.location_id)).fortune;

    let attack_roll = dice
        .roll()
        .saturating_add(attacker_fortune)
        .saturating_add(advantage_bonus(attacker_class, defender_class));
    let defend_roll = dice
        .roll()
        .saturating_add(defender_fortune)
        .saturating_add(home_fortune)
        .saturating_add(advantage_bonus(defender_class, attacker_class));
    let diff = attack_roll.saturating_sub(defend_roll);

    let message = if diff > 0 {
        let rule = rules.clan_battle.win.lookup(diff);
        let steal = scale(rule.food_steal, attacker_level);
        let shield = scale(rule.wood_shield, attacker_level);

        let (shielded, taken, fallen) = match state.clans.get_mut(&target.clan_id) {
            Some(defender) => {
                let shielded = economy::lose(defender, Resource::Wood, shield.min(steal));
                let taken = economy::lose(defender, Resource::Food, steal - shielded);
                (shielded, taken, defender.food == 0)
            }
            None => (0, 0, false),
        };
        if let Some(clan) = state.clans.get_mut(&attacker_clan) {
            economy::gain(clan, Resource::Food, taken);
        }

        if let Some(attacker) = state.players.get_mut(&action.player_id) {
            attacker.stats.record_win();
            attacker.stats.accrue(Resource::Food, taken);
        }
        if let Some(defender) = defender_id
            .as_deref()
            .and_then(|id| state.players.get_mut(id))
        {
            defender.stats.record_loss();
            defender.stats.attacked_count += 1;
            defender.push_message(format!(
                "{attacker_name} raided {} and carried off food. [-{taken} food]",
                target.clan_name
            ));
        }

        let flavor = dice.flavor(&rule.messages);
        let mut tag = format!("[+{taken} food]");
        if shielded > 0 {
            tag.push_str(&format!(" [{shielded} wood shielded]"));
        }
        let message = reply(state, &action.player_id, tagged(&flavor, &tag));

        if fallen {
            defeat_clan(rules, state, &target.clan_id, &attacker_clan, &action.player_id, dice);
        }
        message
    } else {
        let rule = rules.clan_battle.lose.lookup(diff);
        if let Some(attacker) = state.players.get_mut(&action.player_id) {
            attacker.stats.record_loss();
        }
        if let Some(defender) = defender_id
            .as_deref()
            .and_then(|id| state.players.get_mut(id))
        {
            defender.stats.record_win();
            defender.stats.attacked_count += 1;
            defender.push_message(format!("You held the line against {attacker_name}."));
        }
        let flavor = dice.flavor(&rule.messages);
        reply(
            state,
            &action.player_id,
            tagged(&flavor, &format!("[-{ATTACK_GOLD_COST} gold]")),
        )
    };

    if let Some(attacker) = state.players.get_mut(&action.player_id) {
        attacker.stats.attack_count += 1;
    }
    tracing::debug!(
        attacker = %action.player_id,
        defender = ?defender_id,
        attack_roll,
        defend_roll,
        diff,
        "clan raid resolved"
    );
    Ok(message)
}

/// Marks a clan defeated, empties its wood and gold, and tells every member
/// and the attacker.
fn defeat_clan<D: Dice>(
    rules: &RuleBook,
    state: &mut WorldState,
    fallen: &str,
    conqueror: &str,
    attacker_id: &str,
    dice: &mut D,
) {
    let location = state.home_of(fallen).map(|l| l.name.clone());
    let Some(clan) = state.clans.get_mut(fallen) else {
        return;
    };
    clan.defeated_by = Some(conqueror.to_string());
    clan.wood = 0;
    clan.gold = 0;
    let clan_name = clan.name.clone();

    let template = dice.flavor(&rules.clan_battle.destruction);
    let message = if template.is_empty() {
        format!("{clan_name} has fallen.")
    } else {
        template.replace("{clan}", &clan_name)
    };

    for member in state.members_of(fallen) {
        reply(state, &member, message.clone());
    }
    reply(state, attacker_id, message.clone());

    let id = state.next_event_id("clan_defeated");
    state.events.push(WorldEvent {
        id,
        kind: WorldEventKind::ClanDefeated,
        day: state.day,
        location,
        data: WorldEventData {
            clan_id: Some(fallen.to_string()),
            conqueror_id: Some(conqueror.to_string()),
            message,
            ..Default::default()
        },
    });
    tracing::info!(clan = %fallen, conqueror = %conqueror, "clan defeated");
}
