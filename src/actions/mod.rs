//! Peaceful actions: gathering, exploration and waiting.
//!
//! Resolvers take the shared world state, one action and the dice, push
//! feedback into the acting player's message buffer and return a one-line
//! summary for the player's history.

pub mod explore;
pub mod gather;

pub use explore::resolve_explore;
pub use gather::resolve_gather;

use crate::core::error::{ResolveError, Result};
use crate::world::{Action, ModifierEffects, WorldState};

/// Flavor text followed by a bracketed outcome tag.
pub(crate) fn tagged(flavor: &str, tag: &str) -> String {
    if flavor.is_empty() {
        tag.to_string()
    } else {
        format!("{flavor} {tag}")
    }
}

/// Checks the acting player exists and their clan resolves.
/// Returns the player's clan id.
pub(crate) fn acting_clan(state: &WorldState, player_id: &str) -> Result<String> {
    let player = state
        .players
        .get(player_id)
        .ok_or_else(|| ResolveError::UnknownPlayer(player_id.to_string()))?;
    if !state.clans.contains_key(&player.clan_id) {
        return Err(ResolveError::MissingClan {
            player: player.id.clone(),
            clan: player.clan_id.clone(),
        });
    }
    Ok(player.clan_id.clone())
}

/// Sends feedback to one player and returns it as the action summary.
pub(crate) fn reply(state: &mut WorldState, player_id: &str, message: String) -> String {
    if let Some(player) = state.players.get_mut(player_id) {
        player.push_message(message.clone());
    }
    message
}

/// Effects of the modifier at a location, or none.
pub(crate) fn effects_at(state: &WorldState, location_id: Option<&str>) -> ModifierEffects {
    location_id
        .and_then(|id| state.modifier_at(id))
        .map(|m| m.effects)
        .unwrap_or_default()
}

pub const WAIT_MESSAGE: &str = "You take a moment to observe your surroundings.";

/// WAIT: no dice, just feedback.
pub fn resolve_wait(state: &mut WorldState, action: &Action) -> Result<String> {
    let player = state
        .players
        .get_mut(&action.player_id)
        .ok_or_else(|| ResolveError::UnknownPlayer(action.player_id.clone()))?;
    player.push_message(WAIT_MESSAGE);
    Ok(WAIT_MESSAGE.to_string())
}
