use crate::core::constants::{LEVEL_SCALE_BASE, LEVEL_SCALE_CAP};
use crate::world::Player;

/// Scales a base amount by player level: `floor(base * min(1.05^level, 2))`.
pub fn scale(base: u32, level: u32) -> u32 {
    let multiplier = LEVEL_SCALE_BASE
        .powi(level.min(i32::MAX as u32) as i32)
        .min(LEVEL_SCALE_CAP);
    (base as f64 * multiplier).floor() as u32
}

/// XP needed to leave `level`.
pub fn xp_for_next_level(level: u32) -> u32 {
    let next = level.saturating_add(2);
    next.saturating_mul(next)
}

/// Adds XP and levels up at most once.
/// Returns true if the player levelled.
pub fn grant_xp(player: &mut Player, amount: u32) -> bool {
    player.xp = player.xp.saturating_add(amount);

    let required = xp_for_next_level(player.level);
    if player.xp < required {
        return false;
    }

    player.xp -= required;
    player.level += 1;
    player.push_message(format!("[LEVEL UP: {}]", player.level));
    tracing::debug!(player = %player.id, level = player.level, "level up");
    true
}
