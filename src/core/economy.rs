//! Clan-level resource bookkeeping.

use super::constants::CHAOTIC_DAILY_BONUS;
use super::dice::Dice;
use crate::world::{Clan, Resource, WorldState};

/// Adds to a clan balance. Defeated clans gain nothing.
/// Returns the amount actually added.
pub fn gain(clan: &mut Clan, resource: Resource, amount: u32) -> u32 {
    if clan.is_defeated() {
        return 0;
    }
    let balance = clan.balance_mut(resource);
    let before = *balance;
    *balance = balance.saturating_add(amount);
    *balance - before
}

/// Subtracts from a clan balance, flooring at zero.
/// Returns the amount actually removed.
pub fn lose(clan: &mut Clan, resource: Resource, amount: u32) -> u32 {
    let balance = clan.balance_mut(resource);
    let taken = amount.min(*balance);
    *balance -= taken;
    taken
}

/// End-of-tick income. Clans without a configured bonus get
/// [`CHAOTIC_DAILY_BONUS`] of one random resource.
pub fn apply_daily_bonuses<D: Dice>(state: &mut WorldState, dice: &mut D) {
    for clan in state.clans.values_mut() {
        if clan.is_defeated() {
            continue;
        }
        match clan.daily_bonus {
            Some(bonus) => {
                for resource in Resource::ALL {
                    gain(clan, resource, bonus.get(resource));
                }
            }
            None => {
                let resource = dice.pick(&Resource::ALL).copied().unwrap_or(Resource::Food);
                gain(clan, resource, CHAOTIC_DAILY_BONUS);
                tracing::debug!(clan = %clan.id, %resource, "chaotic daily bonus");
            }
        }
    }
}
