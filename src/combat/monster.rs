use crate::actions::{acting_clan, effects_at, reply, tagged};
use crate::core::dice::Dice;
use crate::core::error::{ResolveError, Result};
use crate::core::progression::{grant_xp, scale};
use crate::rules::{BonusKind, RuleBook};
use crate::titles::{fortune_bonus, title_bonus};
use crate::world::{Action, WorldState};

/// ATTACK the monster lair.
///
/// With a boss active at the target the player joins its hunt and no dice
/// are rolled; the fight itself is settled at boss resolution. Otherwise
/// dice: fight roll, then message roll. Note the target modifier's fortune
/// is subtracted here, unlike gathering and exploring.
pub fn resolve_monster_attack<D: Dice>(
    rules: &RuleBook,
    state: &mut WorldState,
    action: &Action,
    dice: &mut D,
) -> Result<String> {
    acting_clan(state, &action.player_id)?;
    let target = action.target.as_deref().unwrap_or_default();

    if let Some(boss) = state
        .active_boss
        .as_mut()
        .filter(|boss| boss.location_id == target)
    {
        if !boss.participants.contains(&action.player_id) {
            boss.participants.push(action.player_id.clone());
        }
        let boss_name = rules
            .boss(&boss.boss_id)
            .map_or(boss.boss_id.as_str(), |rule| rule.name.as_str())
            .to_string();
        if let Some(player) = state.players.get_mut(&action.player_id) {
            player.stats.attack_count += 1;
        }
        let message = format!(
            "You join the hunt against {boss_name}! Rally your allies before it escapes."
        );
        tracing::debug!(player = %action.player_id, boss = %boss_name, "joined boss hunt");
        return Ok(reply(state, &action.player_id, message));
    }

    let modifier_fortune = effects_at(state, Some(target)).fortune;
    let player = state
        .players
        .get_mut(&action.player_id)
        .ok_or_else(|| ResolveError::UnknownPlayer(action.player_id.clone()))?;
    let roll = dice
        .roll()
        .saturating_add(fortune_bonus(&rules.titles, player))
        .saturating_sub(modifier_fortune);
    let rule = rules.monster.lookup(roll);
    let xp = scale(rule.xp, player.level) + title_bonus(&rules.titles, player, BonusKind::Xp);
    grant_xp(player, xp);

    player.stats.monster_encountered += 1;
    if rule.kill {
        player.stats.monster_killed += 1;
    }
    player.stats.attack_count += 1;

    let flavor = dice.flavor(&rule.messages);
    let message = tagged(&flavor, &format!("[+{xp} xp]"));
    player.push_message(message.clone());
    tracing::debug!(player = %player.id, roll, kill = rule.kill, "monster fight resolved");
    Ok(message)
}
