use crate::world::Resource;

// Dice
pub const DICE_SIDES: i32 = 20;

// World layout
pub const MONSTER_LAIR_ID: &str = "monsters_base";
pub const CLAN_STARTING_BALANCE: u32 = 100;
pub const PLAYER_HISTORY_LEN: usize = 5;

// Level scaling: floor(base * min(LEVEL_SCALE_BASE^level, LEVEL_SCALE_CAP))
pub const LEVEL_SCALE_BASE: f64 = 1.05;
pub const LEVEL_SCALE_CAP: f64 = 2.0;

// Titles
pub const TITLE_BONUS_CAP: u32 = 3;

// Clan combat
pub const ATTACK_GOLD_COST: u32 = 20;
pub const CLASS_ADVANTAGE_BONUS: i32 = 2;

// Exploration traps pick the lost resource by roll mod 4; food is twice as likely
pub const TRAP_LOSS_TABLE: [Resource; 4] =
    [Resource::Food, Resource::Food, Resource::Wood, Resource::Gold];

// Spawning. Boss needs roll > threshold, modifier needs roll < threshold.
pub const BOSS_SPAWN_THRESHOLD: i32 = 17;
pub const MODIFIER_SPAWN_THRESHOLD: i32 = 4;

// Daily income for clans without a configured bonus
pub const CHAOTIC_DAILY_BONUS: u32 = 15;

// Narration ignores resource deltas below this
pub const RESOURCE_SURGE_THRESHOLD: u32 = 10;

// Persistence and ingestion
pub const STATE_FILE: &str = "gamestate.json";
pub const COMMENT_WINDOW_HOURS: i64 = 24;
