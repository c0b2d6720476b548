//! Combat: clan raids and monster fights.

pub mod clan;
pub mod monster;

pub use clan::resolve_clan_attack;
pub use monster::resolve_monster_attack;

use crate::core::constants::CLASS_ADVANTAGE_BONUS;
use crate::world::PlayerClass;

/// Bonus a side earns against the other from the class cycle.
pub fn advantage_bonus(own: PlayerClass, other: PlayerClass) -> i32 {
    if own.has_advantage_over(other) {
        CLASS_ADVANTAGE_BONUS
    } else {
        0
    }
}
