//! Built-in rule files, embedded at compile time.

use super::RuleSources;

/// File names, in [`RuleSources`] field order.
pub const FILE_NAMES: [&str; 7] = [
    "gather.json",
    "explore.json",
    "attack_clan.json",
    "attack_monster.json",
    "bosses.json",
    "location_events.json",
    "titles.json",
];

pub const BUILTIN: RuleSources<'static> = RuleSources {
    gather: include_str!("data/gather.json"),
    explore: include_str!("data/explore.json"),
    attack_clan: include_str!("data/attack_clan.json"),
    attack_monster: include_str!("data/attack_monster.json"),
    bosses: include_str!("data/bosses.json"),
    location_events: include_str!("data/location_events.json"),
    titles: include_str!("data/titles.json"),
};
