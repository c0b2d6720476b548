use super::{acting_clan, effects_at, reply, tagged};
use crate::core::dice::Dice;
use crate::core::economy;
use crate::core::error::{ResolveError, Result};
use crate::core::progression::scale;
use crate::rules::{BonusKind, RuleBook};
use crate::titles::{fortune_bonus, title_bonus};
use crate::world::{Action, Resource, WorldState};

/// GATHER food, wood or gold for the player's clan.
///
/// Dice: outcome roll, then message roll. The home location's modifier
/// applies its `fortune` and `gather` effects.
pub fn resolve_gather<D: Dice>(
    rules: &RuleBook,
    state: &mut WorldState,
    action: &Action,
    dice: &mut D,
) -> Result<String> {
    let clan_id = acting_clan(state, &action.player_id)?;

    let Some(resource) = action.target.as_deref().and_then(Resource::parse) else {
        let message = "You can only gather food, wood or gold.".to_string();
        return Ok(reply(state, &action.player_id, message));
    };

    let home = state.home_of(&clan_id).map(|l| l.id.clone());
    let effects = effects_at(state, home.as_deref());

    let player = state
        .players
        .get_mut(&action.player_id)
        .ok_or_else(|| ResolveError::UnknownPlayer(action.player_id.clone()))?;
    let roll = dice
        .roll()
        .saturating_add(fortune_bonus(&rules.titles, player))
        .saturating_add(effects.fortune)
        .saturating_add(effects.gather);
    let rule = rules.gather.lookup(roll);
    let amount = scale(rule.reward, player.level)
        + title_bonus(&rules.titles, player, BonusKind::from(resource));

    if let Some(clan) = state.clans.get_mut(&clan_id) {
        economy::gain(clan, resource, amount);
    }
    player.stats.record_gather(resource, amount);

    let flavor = dice.flavor(&rule.messages);
    let message = tagged(&flavor, &format!("[+{amount} {resource}]"));
    player.push_message(message.clone());
    tracing::debug!(player = %player.id, roll, amount, %resource, "gather resolved");
    Ok(message)
}
