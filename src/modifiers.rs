//! Location modifiers: weather, invasions, blessings and curses.
//!
//! A modifier lasts one day. Its effects shift rolls made at its location,
//! and invasions or curses also drain the owning clan's stores.

use crate::core::constants::{MODIFIER_SPAWN_THRESHOLD, MONSTER_LAIR_ID};
use crate::core::dice::Dice;
use crate::core::economy;
use crate::rules::RuleBook;
use crate::world::{
    LocationId, LocationModifier, ModifierKind, Resource, WorldEvent, WorldEventData,
    WorldState,
};

/// Applies percentage losses of every active modifier to the clan that owns
/// its location. Defeated clans are left alone.
pub fn apply_resource_losses(state: &mut WorldState) {
    for modifier in &state.location_modifiers {
        let Some(loss) = modifier.effects.clan_resource_loss_pct else {
            continue;
        };
        let Some(clan) = state
            .locations
            .get(&modifier.location_id)
            .and_then(|l| l.clan_id.as_ref())
            .and_then(|id| state.clans.get_mut(id))
        else {
            continue;
        };
        if clan.is_defeated() {
            continue;
        }
        for resource in Resource::ALL {
            let Some(pct) = loss.get(resource) else {
                continue;
            };
            let amount = (clan.balance(resource) as f64 * pct).floor().max(0.0) as u32;
            let lost = economy::lose(clan, resource, amount);
            tracing::debug!(clan = %clan.id, modifier = %modifier.id, %resource, lost, "modifier drain");
        }
    }
}

/// Rolls for today's modifier, replacing yesterday's.
///
/// Dice: spawn check, location pick (only with no explore target), event
/// pick, message roll. Only weather can settle over the monster lair.
/// Returns the new modifier's id.
pub fn try_spawn_modifier<D: Dice>(
    rules: &RuleBook,
    state: &mut WorldState,
    most_explored: Option<&str>,
    dice: &mut D,
) -> Option<String> {
    state.location_modifiers.clear();

    let roll = dice.roll();
    if roll >= MODIFIER_SPAWN_THRESHOLD {
        return None;
    }

    let location_id: LocationId = match most_explored {
        Some(id) => id.to_string(),
        None => {
            let ids: Vec<&LocationId> = state.locations.keys().collect();
            dice.pick(&ids).map(|id| id.to_string())?
        }
    };
    let rule = dice.pick(&rules.location_events)?;
    if location_id == MONSTER_LAIR_ID && rule.kind != ModifierKind::Weather {
        tracing::debug!(event = %rule.id, "only weather reaches the lair");
        return None;
    }

    let message = dice.flavor(&rule.messages);
    state.location_modifiers.push(LocationModifier {
        id: rule.id.clone(),
        kind: rule.kind,
        location_id: location_id.clone(),
        started_on: state.day,
        effects: rule.effects,
        messages: rule.messages.clone(),
    });
    let id = state.next_event_id("modifier");
    let location = Some(state.location_name(&location_id));
    state.events.push(WorldEvent {
        id,
        kind: rule.kind.into(),
        day: state.day,
        location,
        data: WorldEventData {
            effects: Some(rule.effects),
            message,
            ..Default::default()
        },
    });
    tracing::info!(event = %rule.id, location = %location_id, "location modifier spawned");
    Some(rule.id.clone())
}
