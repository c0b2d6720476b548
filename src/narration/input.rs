//! Structured narration inputs built from world snapshots.
//!
//! These are pure projections of the state. Narrators only ever see these
//! records, never the world itself.

use serde::Serialize;

use crate::core::constants::RESOURCE_SURGE_THRESHOLD;
use crate::world::{
    Location, ModifierEffects, ModifierKind, Resource, WorldEventKind, WorldState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BossStatus {
    Appeared,
    Defeated,
    Disappeared,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossEventInput {
    pub name: String,
    pub location: String,
    pub status: BossStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifierEventInput {
    #[serde(rename = "type")]
    pub kind: ModifierKind,
    pub location: String,
    pub effects: ModifierEffects,
    pub message: String,
}

/// What happened across the world today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldNarrationInput {
    pub day: u32,
    pub population: usize,
    pub boss_events: Vec<BossEventInput>,
    pub location_events: Vec<ModifierEventInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationEventInput {
    LocationEvent {
        event_type: ModifierKind,
        effects: ModifierEffects,
        message: Option<String>,
    },
    ClanDefeated {
        defeated_by: String,
    },
    ClanConquered {
        target_clan_name: String,
    },
    ResourceSurge {
        resource: Resource,
        amount: u32,
    },
}

/// What happened at one location today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationNarrationInput {
    pub day: u32,
    pub location: String,
    pub clan: Option<String>,
    pub events: Vec<LocationEventInput>,
    pub population: usize,
}

pub fn build_world_input(state: &WorldState) -> WorldNarrationInput {
    let mut boss_events = Vec::new();
    let mut location_events = Vec::new();

    for event in state.events_on(state.day) {
        let location = event
            .location
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        if event.is_boss_event() {
            let status = match event.kind {
                WorldEventKind::BossAppeared => BossStatus::Appeared,
                WorldEventKind::BossDefeated => BossStatus::Defeated,
                _ => BossStatus::Disappeared,
            };
            boss_events.push(BossEventInput {
                name: event
                    .data
                    .boss_name
                    .clone()
                    .unwrap_or_else(|| "Boss".to_string()),
                location,
                status,
                message: event.data.message.clone(),
            });
            continue;
        }

        if !event.is_modifier_event() {
            continue;
        }
        let kind = match event.kind {
            WorldEventKind::Weather => ModifierKind::Weather,
            WorldEventKind::Invasion => ModifierKind::Invasion,
            WorldEventKind::Blessing => ModifierKind::Blessing,
            _ => ModifierKind::Curse,
        };
        location_events.push(ModifierEventInput {
            kind,
            location,
            effects: event.data.effects.unwrap_or_default(),
            message: event.data.message.clone(),
        });
    }

    WorldNarrationInput {
        day: state.day,
        population: state.players.len(),
        boss_events,
        location_events,
    }
}

/// Compares the location's owning clan before and after the tick.
pub fn build_location_input(
    previous: &WorldState,
    state: &WorldState,
    location: &Location,
) -> LocationNarrationInput {
    let clan_id = location.clan_id.as_deref();
    let prev_clan = clan_id.and_then(|id| previous.clans.get(id));
    let clan = clan_id.and_then(|id| state.clans.get(id));
    let mut events = Vec::new();

    for modifier in state
        .location_modifiers
        .iter()
        .filter(|m| m.location_id == location.id)
    {
        events.push(LocationEventInput::LocationEvent {
            event_type: modifier.kind,
            effects: modifier.effects,
            message: modifier.messages.first().cloned(),
        });
    }

    if let (Some(prev), Some(curr)) = (prev_clan, clan) {
        if let (None, Some(conqueror)) = (&prev.defeated_by, &curr.defeated_by) {
            events.push(LocationEventInput::ClanDefeated {
                defeated_by: state
                    .clans
                    .get(conqueror)
                    .map_or_else(|| conqueror.clone(), |c| c.name.clone()),
            });
        }
    }

    if let Some(curr) = clan {
        let conquered = state.clans.values().find(|c| {
            c.defeated_by.as_deref() == Some(curr.id.as_str())
                && previous
                    .clans
                    .get(&c.id)
                    .is_some_and(|p| p.defeated_by.is_none())
        });
        if let Some(conquered) = conquered {
            events.push(LocationEventInput::ClanConquered {
                target_clan_name: conquered.name.clone(),
            });
        }
    }

    if let (Some(prev), Some(curr)) = (prev_clan, clan) {
        if !curr.is_defeated() {
            // Largest gain; the first resource wins a tie
            let surge = Resource::ALL
                .into_iter()
                .map(|r| (r, curr.balance(r).saturating_sub(prev.balance(r))))
                .rev()
                .max_by_key(|(_, gain)| *gain)
                .filter(|(_, gain)| *gain >= RESOURCE_SURGE_THRESHOLD);
            if let Some((resource, amount)) = surge {
                events.push(LocationEventInput::ResourceSurge { resource, amount });
            }
        }
    }

    LocationNarrationInput {
        day: state.day,
        location: location.name.clone(),
        clan: clan.map(|c| c.name.clone()),
        events,
        population: clan_id.map_or(0, |id| state.clan_population(id)),
    }
}
