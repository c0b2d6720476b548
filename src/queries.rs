//! Read-only queries answered outside the tick.

use crate::core::progression::xp_for_next_level;
use crate::world::WorldState;

pub const NOT_JOINED: &str = "You have not joined the world yet. Create a character first.";

/// Renders what a player sees at home: day, base, clan balances, clanmates
/// and the effects in play.
pub fn look(state: &WorldState, player_id: &str) -> String {
    let Some(player) = state.players.get(player_id) else {
        return NOT_JOINED.to_string();
    };

    let mut out = String::new();
    let home = state.home_of(&player.clan_id);
    match home {
        Some(location) => {
            out.push_str(&format!("**[Day {} - {}]**\n\n", state.day, location.name));
            if !location.description.is_empty() {
                out.push_str(&format!("{}\n\n", location.description));
            }
        }
        None => out.push_str(&format!("**[Day {}]**\n\n", state.day)),
    }

    out.push_str(&format!(
        "**{}** the {} (level {}, {}/{} xp)\n",
        player.name,
        player.class,
        player.level,
        player.xp,
        xp_for_next_level(player.level)
    ));
    if !player.titles.is_empty() {
        out.push_str(&format!("Titles: {}\n", player.titles.join(", ")));
    }
    out.push('\n');

    out.push_str("**Clan**\n");
    match state.clans.get(&player.clan_id) {
        Some(clan) => {
            out.push_str(&format!(
                "- {}: {} food, {} wood, {} gold\n",
                clan.name, clan.food, clan.wood, clan.gold
            ));
            if let Some(conqueror) = &clan.defeated_by {
                let by = state
                    .clans
                    .get(conqueror)
                    .map_or(conqueror.as_str(), |c| c.name.as_str());
                out.push_str(&format!("- Fallen to {by}\n"));
            }
        }
        None => out.push_str("- (none)\n"),
    }
    out.push('\n');

    out.push_str("**Clanmates**\n");
    let mates: Vec<_> = state
        .players
        .values()
        .filter(|p| p.clan_id == player.clan_id && p.id != player.id)
        .collect();
    if mates.is_empty() {
        out.push_str("- (no one else)\n");
    }
    for mate in mates {
        if mate.account.username.is_empty() {
            out.push_str(&format!("- {}\n", mate.name));
        } else {
            out.push_str(&format!("- {} (@{})\n", mate.name, mate.account.username));
        }
    }
    out.push('\n');

    out.push_str("**Active Effects**\n");
    let mut any = false;
    if let Some(modifier) = home.and_then(|l| state.modifier_at(&l.id)) {
        let message = modifier.messages.first().map_or("", String::as_str);
        out.push_str(&format!("- {}: {}\n", modifier.kind.name(), message));
        any = true;
    }
    if let Some(boss) = &state.active_boss {
        out.push_str(&format!(
            "- {} prowls {} until day {}\n",
            boss.boss_id,
            state.location_name(&boss.location_id),
            boss.expires_on
        ));
        any = true;
    }
    if !any {
        out.push_str("- (none)\n");
    }

    out.trim_end().to_string()
}
