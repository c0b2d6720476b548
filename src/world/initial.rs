//! The world a fresh game starts from.

use super::types::{Clan, Location, ResourceBundle, WorldState};
use crate::core::constants::{CLAN_STARTING_BALANCE, MONSTER_LAIR_ID};

struct ClanSeed {
    key: &'static str,
    name: &'static str,
    motto: &'static str,
    bonus: Option<ResourceBundle>,
}

const CLAN_SEEDS: [ClanSeed; 5] = [
    ClanSeed {
        key: "blue",
        name: "The Blue Whales",
        motto: "We tread the world and endure storms not by rage, but by patience and depth.",
        bonus: Some(ResourceBundle { food: 5, wood: 5, gold: 5 }),
    },
    ClanSeed {
        key: "red",
        name: "The Red Lions",
        motto: "We are the roar before the clash. Our banners move where blood is spilled.",
        bonus: Some(ResourceBundle { food: 10, wood: 0, gold: 5 }),
    },
    ClanSeed {
        key: "purple",
        name: "The Purple Dragons",
        motto: "We walk between myth and fire. Power is not taken, it is awakened.",
        bonus: None,
    },
    ClanSeed {
        key: "yellow",
        name: "The Yellow Eagles",
        motto: "From the highest skies we watch and wait. When we strike, it is already decided.",
        bonus: Some(ResourceBundle { food: 0, wood: 5, gold: 10 }),
    },
    ClanSeed {
        key: "black",
        name: "The Black Vipers",
        motto: "We do not announce our presence. By the time the venom is felt, it is too late.",
        bonus: Some(ResourceBundle { food: 5, wood: 10, gold: 0 }),
    },
];

impl WorldState {
    /// Five clans, each owning one base, plus the unowned monster lair.
    pub fn initial() -> Self {
        let mut state = WorldState::default();

        for seed in &CLAN_SEEDS {
            let clan_id = format!("{}_clan", seed.key);
            let location_id = format!("{}_base", seed.key);

            state.locations.insert(
                location_id.clone(),
                Location {
                    id: location_id,
                    name: format!("{} Stronghold", seed.name.trim_start_matches("The ")),
                    description: format!("The base of {}.", seed.name),
                    clan_id: Some(clan_id.clone()),
                },
            );
            state.clans.insert(
                clan_id.clone(),
                Clan {
                    id: clan_id,
                    name: seed.name.to_string(),
                    description: seed.motto.to_string(),
                    food: CLAN_STARTING_BALANCE,
                    wood: CLAN_STARTING_BALANCE,
                    gold: CLAN_STARTING_BALANCE,
                    defeated_by: None,
                    daily_bonus: seed.bonus,
                },
            );
        }

        state.locations.insert(
            MONSTER_LAIR_ID.to_string(),
            Location {
                id: MONSTER_LAIR_ID.to_string(),
                name: "The Monster Lair".to_string(),
                description: "No one dares to claim this land. It breathes on its own, \
                              spawning monsters as naturally as the forest grows leaves."
                    .to_string(),
                clan_id: None,
            },
        );

        state
    }
}
