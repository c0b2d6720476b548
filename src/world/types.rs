//! World snapshot types: locations, clans, players, bosses, modifiers and the
//! world event log.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::constants::PLAYER_HISTORY_LEN;

pub type PlayerId = String;
pub type ClanId = String;
pub type LocationId = String;

/// The three clan-level resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Food,
    Wood,
    Gold,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Food, Resource::Wood, Resource::Gold];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Food => "food",
            Resource::Wood => "wood",
            Resource::Gold => "gold",
        }
    }

    /// Parses a resource name, ignoring case.
    pub fn parse(s: &str) -> Option<Resource> {
        match s.to_ascii_lowercase().as_str() {
            "food" => Some(Resource::Food),
            "wood" => Some(Resource::Wood),
            "gold" => Some(Resource::Gold),
            _ => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Player classes. Adventurer is neutral in the advantage cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerClass {
    Warrior,
    Lancer,
    Archer,
    Monk,
    Adventurer,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 5] = [
        PlayerClass::Warrior,
        PlayerClass::Lancer,
        PlayerClass::Archer,
        PlayerClass::Monk,
        PlayerClass::Adventurer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlayerClass::Warrior => "Warrior",
            PlayerClass::Lancer => "Lancer",
            PlayerClass::Archer => "Archer",
            PlayerClass::Monk => "Monk",
            PlayerClass::Adventurer => "Adventurer",
        }
    }

    /// Parses an exact class name as written on a character sheet.
    pub fn from_name(s: &str) -> Option<PlayerClass> {
        PlayerClass::ALL.into_iter().find(|c| c.name() == s)
    }

    /// The class this one beats: Warrior→Lancer→Archer→Monk→Warrior.
    pub fn beats(&self) -> Option<PlayerClass> {
        match self {
            PlayerClass::Warrior => Some(PlayerClass::Lancer),
            PlayerClass::Lancer => Some(PlayerClass::Archer),
            PlayerClass::Archer => Some(PlayerClass::Monk),
            PlayerClass::Monk => Some(PlayerClass::Warrior),
            PlayerClass::Adventurer => None,
        }
    }

    pub fn has_advantage_over(&self, other: PlayerClass) -> bool {
        self.beats() == Some(other)
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A food/wood/gold triple, used for daily clan bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceBundle {
    #[serde(default)]
    pub food: u32,
    #[serde(default)]
    pub wood: u32,
    #[serde(default)]
    pub gold: u32,
}

impl ResourceBundle {
    pub fn new(food: u32, wood: u32, gold: u32) -> Self {
        Self { food, wood, gold }
    }

    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Food => self.food,
            Resource::Wood => self.wood,
            Resource::Gold => self.gold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    /// Owning clan. The monster lair is unowned.
    #[serde(default)]
    pub clan_id: Option<ClanId>,
}

impl Location {
    /// The lair is the one location no clan owns.
    pub fn is_monster_lair(&self) -> bool {
        self.clan_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clan {
    pub id: ClanId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub food: u32,
    pub wood: u32,
    pub gold: u32,
    /// Clan id of the conqueror.
    #[serde(default)]
    pub defeated_by: Option<ClanId>,
    /// Fixed daily income. `None` marks the chaotic archetype.
    #[serde(default)]
    pub daily_bonus: Option<ResourceBundle>,
}

impl Clan {
    pub fn is_defeated(&self) -> bool {
        self.defeated_by.is_some()
    }

    pub fn balance(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Food => self.food,
            Resource::Wood => self.wood,
            Resource::Gold => self.gold,
        }
    }

    pub fn balance_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Food => &mut self.food,
            Resource::Wood => &mut self.wood,
            Resource::Gold => &mut self.gold,
        }
    }
}

/// Identity of the account that owns a player (the issue thread author).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub user_id: u64,
    pub issue_number: u64,
}

/// Lifetime counters. Title requirements address these by dotted path,
/// e.g. `stats.monster_killed`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub joined_day: u32,
    pub last_action_day: u32,
    pub gather_food_count: u32,
    pub gather_wood_count: u32,
    pub gather_gold_count: u32,
    /// Personal lifetime resource totals; accrue even for defeated clans.
    pub food: u32,
    pub wood: u32,
    pub gold: u32,
    pub explore_count: u32,
    pub attack_count: u32,
    pub player_wins: u32,
    pub player_losses: u32,
    pub monster_encountered: u32,
    pub monster_killed: u32,
    pub boss_killed: u32,
    pub attack_win_streak: u32,
    pub attack_lose_streak: u32,
    pub attacked_count: u32,
}

impl PlayerStats {
    pub fn record_gather(&mut self, resource: Resource, amount: u32) {
        match resource {
            Resource::Food => self.gather_food_count += 1,
            Resource::Wood => self.gather_wood_count += 1,
            Resource::Gold => self.gather_gold_count += 1,
        }
        self.accrue(resource, amount);
    }

    pub fn accrue(&mut self, resource: Resource, amount: u32) {
        let total = match resource {
            Resource::Food => &mut self.food,
            Resource::Wood => &mut self.wood,
            Resource::Gold => &mut self.gold,
        };
        *total = total.saturating_add(amount);
    }

    pub fn record_win(&mut self) {
        self.player_wins += 1;
        self.attack_win_streak += 1;
        self.attack_lose_streak = 0;
    }

    pub fn record_loss(&mut self) {
        self.player_losses += 1;
        self.attack_lose_streak += 1;
        self.attack_win_streak = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub day: u32,
    pub action: ActionKind,
    #[serde(default)]
    pub target: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub account: Account,
    pub name: String,
    pub clan_id: ClanId,
    pub class: PlayerClass,
    pub level: u32,
    pub xp: u32,
    #[serde(default)]
    pub backstory: String,
    /// Unlocked title ids, unique, in unlock order.
    #[serde(default)]
    pub titles: Vec<String>,
    /// Outbound messages for the current tick.
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub stats: PlayerStats,
    /// Most recent actions, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, clan_id: impl Into<ClanId>, class: PlayerClass) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            account: Account::default(),
            clan_id: clan_id.into(),
            class,
            level: 1,
            xp: 0,
            backstory: String::new(),
            titles: Vec::new(),
            messages: Vec::new(),
            stats: PlayerStats::default(),
            history: Vec::new(),
        }
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// The tick's messages joined into one outbound comment body.
    pub fn message_text(&self) -> String {
        self.messages.join("\n")
    }

    pub fn has_title(&self, title_id: &str) -> bool {
        self.titles.iter().any(|t| t == title_id)
    }

    /// Appends a history entry, keeping only the most recent ones.
    pub fn record_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        if self.history.len() > PLAYER_HISTORY_LEN {
            let excess = self.history.len() - PLAYER_HISTORY_LEN;
            self.history.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Gather,
    Explore,
    Attack,
    Wait,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Gather => "GATHER",
            ActionKind::Explore => "EXPLORE",
            ActionKind::Attack => "ATTACK",
            ActionKind::Wait => "WAIT",
        }
    }
}

/// A player intent for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub player_id: PlayerId,
    pub kind: ActionKind,
    #[serde(default)]
    pub target: Option<String>,
}

impl Action {
    pub fn new(player_id: impl Into<PlayerId>, kind: ActionKind, target: Option<&str>) -> Self {
        Self {
            player_id: player_id.into(),
            kind,
            target: target.map(str::to_string),
        }
    }

    pub fn gather(player_id: impl Into<PlayerId>, resource: Resource) -> Self {
        Self::new(player_id, ActionKind::Gather, Some(resource.name()))
    }

    pub fn explore(player_id: impl Into<PlayerId>, location_id: &str) -> Self {
        Self::new(player_id, ActionKind::Explore, Some(location_id))
    }

    pub fn attack(player_id: impl Into<PlayerId>, location_id: &str) -> Self {
        Self::new(player_id, ActionKind::Attack, Some(location_id))
    }

    pub fn wait(player_id: impl Into<PlayerId>) -> Self {
        Self::new(player_id, ActionKind::Wait, None)
    }
}

/// The single world boss while it is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossState {
    pub boss_id: String,
    pub location_id: LocationId,
    pub appeared_on: u32,
    pub expires_on: u32,
    #[serde(default)]
    pub participants: Vec<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModifierKind {
    Weather,
    Invasion,
    Blessing,
    Curse,
}

impl ModifierKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModifierKind::Weather => "WEATHER",
            ModifierKind::Invasion => "INVASION",
            ModifierKind::Blessing => "BLESSING",
            ModifierKind::Curse => "CURSE",
        }
    }
}

/// Fractions of each clan balance lost per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLossPct {
    pub food: Option<f64>,
    pub wood: Option<f64>,
    pub gold: Option<f64>,
}

impl ResourceLossPct {
    pub fn get(&self, resource: Resource) -> Option<f64> {
        match resource {
            Resource::Food => self.food,
            Resource::Wood => self.wood,
            Resource::Gold => self.gold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierEffects {
    pub explore: i32,
    pub gather: i32,
    pub fortune: i32,
    pub clan_resource_loss_pct: Option<ResourceLossPct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationModifier {
    pub id: String,
    pub kind: ModifierKind,
    pub location_id: LocationId,
    pub started_on: u32,
    #[serde(default)]
    pub effects: ModifierEffects,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorldEventKind {
    BossAppeared,
    BossDefeated,
    BossDisappeared,
    Weather,
    Invasion,
    Blessing,
    Curse,
    ClanDefeated,
}

impl From<ModifierKind> for WorldEventKind {
    fn from(kind: ModifierKind) -> Self {
        match kind {
            ModifierKind::Weather => WorldEventKind::Weather,
            ModifierKind::Invasion => WorldEventKind::Invasion,
            ModifierKind::Blessing => WorldEventKind::Blessing,
            ModifierKind::Curse => WorldEventKind::Curse,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldEventData {
    pub boss_id: Option<String>,
    pub boss_name: Option<String>,
    pub effects: Option<ModifierEffects>,
    pub clan_id: Option<ClanId>,
    pub conqueror_id: Option<ClanId>,
    pub message: String,
}

/// One entry of the append-only world history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub id: String,
    pub kind: WorldEventKind,
    pub day: u32,
    /// Display name of the location, if any.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub data: WorldEventData,
}

impl WorldEvent {
    pub fn is_boss_event(&self) -> bool {
        matches!(
            self.kind,
            WorldEventKind::BossAppeared
                | WorldEventKind::BossDefeated
                | WorldEventKind::BossDisappeared
        )
    }

    pub fn is_modifier_event(&self) -> bool {
        matches!(
            self.kind,
            WorldEventKind::Weather
                | WorldEventKind::Invasion
                | WorldEventKind::Blessing
                | WorldEventKind::Curse
        )
    }
}

/// The full world snapshot passed between ticks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldState {
    pub day: u32,
    #[serde(default)]
    pub locations: BTreeMap<LocationId, Location>,
    #[serde(default)]
    pub clans: BTreeMap<ClanId, Clan>,
    #[serde(default)]
    pub players: BTreeMap<PlayerId, Player>,
    #[serde(default)]
    pub active_boss: Option<BossState>,
    #[serde(default)]
    pub location_modifiers: Vec<LocationModifier>,
    #[serde(default)]
    pub events: Vec<WorldEvent>,
}

impl WorldState {
    /// The location owned by a clan.
    pub fn home_of(&self, clan_id: &str) -> Option<&Location> {
        self.locations
            .values()
            .find(|l| l.clan_id.as_deref() == Some(clan_id))
    }

    /// The active modifier at a location, if any.
    pub fn modifier_at(&self, location_id: &str) -> Option<&LocationModifier> {
        self.location_modifiers
            .iter()
            .find(|m| m.location_id == location_id)
    }

    /// Ids of every player in a clan, in id order.
    pub fn members_of(&self, clan_id: &str) -> Vec<PlayerId> {
        self.players
            .values()
            .filter(|p| p.clan_id == clan_id)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Player count of a clan, which is also the population of its home.
    pub fn clan_population(&self, clan_id: &str) -> usize {
        self.players.values().filter(|p| p.clan_id == clan_id).count()
    }

    pub fn events_on(&self, day: u32) -> impl Iterator<Item = &WorldEvent> {
        self.events.iter().filter(move |e| e.day == day)
    }

    /// A fresh event id, unique within the log.
    pub fn next_event_id(&self, prefix: &str) -> String {
        format!("{prefix}_{}_{}", self.day, self.events.len())
    }

    pub fn location_name(&self, location_id: &str) -> String {
        self.locations
            .get(location_id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| location_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advantage_cycle() {
        assert!(PlayerClass::Warrior.has_advantage_over(PlayerClass::Lancer));
        assert!(PlayerClass::Lancer.has_advantage_over(PlayerClass::Archer));
        assert!(PlayerClass::Archer.has_advantage_over(PlayerClass::Monk));
        assert!(PlayerClass::Monk.has_advantage_over(PlayerClass::Warrior));
        assert!(!PlayerClass::Lancer.has_advantage_over(PlayerClass::Warrior));
    }

    #[test]
    fn test_adventurer_is_neutral() {
        for class in PlayerClass::ALL {
            assert!(!PlayerClass::Adventurer.has_advantage_over(class));
            assert!(!class.has_advantage_over(PlayerClass::Adventurer));
        }
    }

    #[test]
    fn test_history_keeps_last_five() {
        let mut player = Player::new("p1", "clanA", PlayerClass::Monk);
        for day in 1..=8 {
            player.record_history(HistoryEntry {
                day,
                action: ActionKind::Wait,
                target: None,
                summary: String::new(),
            });
        }
        assert_eq!(player.history.len(), PLAYER_HISTORY_LEN);
        assert_eq!(player.history[0].day, 4);
        assert_eq!(player.history[4].day, 8);
    }

    #[test]
    fn test_resource_parse_ignores_case() {
        assert_eq!(Resource::parse("FOOD"), Some(Resource::Food));
        assert_eq!(Resource::parse("Gold"), Some(Resource::Gold));
        assert_eq!(Resource::parse("stone"), None);
    }

    #[test]
    fn test_streaks_reset_on_opposite_outcome() {
        let mut stats = PlayerStats::default();
        stats.record_win();
        stats.record_win();
        assert_eq!(stats.attack_win_streak, 2);
        stats.record_loss();
        assert_eq!(stats.attack_win_streak, 0);
        assert_eq!(stats.attack_lose_streak, 1);
        assert_eq!(stats.player_wins, 2);
        assert_eq!(stats.player_losses, 1);
    }
}
