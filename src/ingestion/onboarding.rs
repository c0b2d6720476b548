//! Enrolling characters and collecting the day's intents from issue threads.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use super::intent::{latest_qualifying_comment, parse_intent};
use super::sheet::parse_character_sheet;
use super::types::{IssueThread, Notice};
use crate::core::constants::COMMENT_WINDOW_HOURS;
use crate::world::{Account, Action, ClanId, Player, PlayerClass, WorldState};

/// Everything ingestion produced for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingested {
    /// Intents in thread order, ready for the tick.
    pub actions: Vec<Action>,
    /// Welcome and refuge replies.
    pub notices: Vec<Notice>,
    /// Issue numbers of extra threads opened by an already-playing user.
    pub duplicates: Vec<u64>,
}

/// Start of the comment window for a tick run at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(COMMENT_WINDOW_HOURS)
}

/// Live headcount of every surviving clan.
fn surviving_populations(state: &WorldState) -> BTreeMap<ClanId, usize> {
    state
        .clans
        .values()
        .filter(|c| !c.is_defeated())
        .map(|c| (c.id.clone(), state.clan_population(&c.id)))
        .collect()
}

/// The smallest surviving clan; ties go to the lowest id.
fn least_populated(populations: &BTreeMap<ClanId, usize>) -> Option<ClanId> {
    populations
        .iter()
        .min_by_key(|(_, count)| **count)
        .map(|(id, _)| id.clone())
}

fn clan_name(state: &WorldState, clan_id: &str) -> String {
    state
        .clans
        .get(clan_id)
        .map_or_else(|| clan_id.to_string(), |c| c.name.clone())
}

/// Walks the open threads: keeps each user's oldest thread, enrolls new
/// characters, moves members of fallen clans to a refuge and reads one intent
/// per thread from comments posted after `since`.
pub fn ingest_threads(
    state: &mut WorldState,
    threads: &[IssueThread],
    since: DateTime<Utc>,
) -> Ingested {
    let mut ingested = Ingested::default();

    let mut by_user: BTreeMap<u64, Vec<&IssueThread>> = BTreeMap::new();
    for thread in threads {
        by_user.entry(thread.user.id).or_default().push(thread);
    }
    let mut canonical = Vec::new();
    for user_threads in by_user.values_mut() {
        user_threads.sort_by_key(|t| (t.created_at, t.number));
        if let Some((first, rest)) = user_threads.split_first() {
            for dup in rest {
                tracing::info!(
                    issue = dup.number,
                    canonical = first.number,
                    user = %dup.user.login,
                    "ignoring duplicate character thread"
                );
                ingested.duplicates.push(dup.number);
            }
            canonical.push(*first);
        }
    }
    // Back to submission order so intents keep their natural ordering
    canonical.sort_by_key(|t| (t.created_at, t.number));

    let mut populations = surviving_populations(state);

    for thread in canonical {
        let player_id = thread.player_id();

        match state.players.get(&player_id) {
            None => {
                let Some(clan_id) = least_populated(&populations) else {
                    tracing::warn!(issue = thread.number, "no surviving clan to join");
                    continue;
                };
                let player = enroll(state, thread, &clan_id);
                ingested.notices.push(Notice {
                    issue_number: thread.number,
                    body: format!(
                        "Welcome, {} the {}, to {}.\nLet's conquer the world together!",
                        player.name,
                        player.class,
                        clan_name(state, &clan_id)
                    ),
                });
                *populations.entry(clan_id.clone()).or_default() += 1;
                state.players.insert(player_id.clone(), player);
            }
            Some(existing) => {
                let fallen = state
                    .clans
                    .get(&existing.clan_id)
                    .is_some_and(|c| c.is_defeated());
                if fallen {
                    if let Some(clan_id) = least_populated(&populations) {
                        tracing::info!(player = %player_id, clan = %clan_id, "offering refuge");
                        ingested.notices.push(Notice {
                            issue_number: thread.number,
                            body: format!(
                                "You have been offered refuge by {}.\nDon't forget the past and avenge your clan!",
                                clan_name(state, &clan_id)
                            ),
                        });
                        *populations.entry(clan_id.clone()).or_default() += 1;
                        if let Some(player) = state.players.get_mut(&player_id) {
                            player.clan_id = clan_id;
                        }
                    }
                }
            }
        }

        if let Some(comment) = latest_qualifying_comment(&thread.comments, thread.user.id, since) {
            let action = parse_intent(&player_id, &comment.body, &state.locations);
            tracing::debug!(player = %player_id, kind = action.kind.name(), "intent received");
            ingested.actions.push(action);
        }
    }

    ingested
}

fn enroll(state: &WorldState, thread: &IssueThread, clan_id: &str) -> Player {
    let sheet = parse_character_sheet(&thread.body);
    let mut player = Player::new(
        thread.player_id(),
        clan_id,
        sheet.class.unwrap_or(PlayerClass::Adventurer),
    );
    player.name = sheet.name.unwrap_or_else(|| thread.user.login.clone());
    player.backstory = sheet.backstory.unwrap_or_default();
    player.account = Account {
        username: thread.user.login.clone(),
        user_id: thread.user.id,
        issue_number: thread.number,
    };
    player.stats.joined_day = state.day;
    player.stats.last_action_day = state.day;
    tracing::info!(
        player = %player.id,
        name = %player.name,
        class = %player.class,
        clan = clan_id,
        "new player enrolled"
    );
    player
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::types::{Comment, ThreadUser};
    use crate::world::ActionKind;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn user(id: u64) -> ThreadUser {
        ThreadUser {
            login: format!("user{id}"),
            id,
            kind: "User".to_string(),
        }
    }

    fn thread(number: u64, user_id: u64, created: DateTime<Utc>, body: &str) -> IssueThread {
        IssueThread {
            number,
            user: user(user_id),
            title: "[Character]".to_string(),
            body: body.to_string(),
            created_at: created,
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_new_players_spread_across_clans() {
        let mut state = WorldState::initial();
        let threads: Vec<IssueThread> = (1..=5)
            .map(|n| thread(n, 100 + n, at(1, n as u32), ""))
            .collect();

        let ingested = ingest_threads(&mut state, &threads, at(1, 0));

        assert_eq!(ingested.notices.len(), 5);
        for clan_id in state.clans.keys() {
            assert_eq!(state.clan_population(clan_id), 1, "{clan_id}");
        }
    }

    #[test]
    fn test_enrollment_reads_sheet() {
        let mut state = WorldState::initial();
        let body = "## Character Name\nAria\n## Class\n- [x] Monk";
        let ingested = ingest_threads(&mut state, &[thread(12, 5, at(1, 1), body)], at(1, 0));

        let player = &state.players["12"];
        assert_eq!(player.name, "Aria");
        assert_eq!(player.class, PlayerClass::Monk);
        assert_eq!(player.account.issue_number, 12);
        assert!(ingested.notices[0].body.starts_with("Welcome, Aria the Monk, to "));
    }

    #[test]
    fn test_defaults_without_sheet() {
        let mut state = WorldState::initial();
        ingest_threads(&mut state, &[thread(3, 9, at(1, 1), "hi")], at(1, 0));
        let player = &state.players["3"];
        assert_eq!(player.name, "user9");
        assert_eq!(player.class, PlayerClass::Adventurer);
    }

    #[test]
    fn test_duplicate_threads_keep_oldest() {
        let mut state = WorldState::initial();
        let threads = vec![
            thread(8, 1, at(2, 0), ""),
            thread(4, 1, at(1, 0), ""),
        ];
        let ingested = ingest_threads(&mut state, &threads, at(1, 0));
        assert_eq!(ingested.duplicates, vec![8]);
        assert!(state.players.contains_key("4"));
        assert!(!state.players.contains_key("8"));
    }

    #[test]
    fn test_refuge_for_fallen_clan() {
        let mut state = WorldState::initial();
        let mut player = Player::new("4", "red_clan", PlayerClass::Warrior);
        player.account.user_id = 1;
        state.players.insert("4".to_string(), player);
        if let Some(clan) = state.clans.get_mut("red_clan") {
            clan.defeated_by = Some("blue_clan".to_string());
        }

        let ingested = ingest_threads(&mut state, &[thread(4, 1, at(1, 0), "")], at(1, 0));

        assert_ne!(state.players["4"].clan_id, "red_clan");
        assert!(ingested.notices[0].body.starts_with("You have been offered refuge by "));
    }

    #[test]
    fn test_intent_from_latest_owner_comment() {
        let mut state = WorldState::initial();
        let mut t = thread(4, 1, at(1, 0), "");
        t.comments = vec![
            Comment {
                body: "GATHER gold".to_string(),
                user: user(1),
                created_at: at(1, 5),
            },
            Comment {
                body: "ATTACK red_base".to_string(),
                user: user(2),
                created_at: at(1, 6),
            },
        ];
        let ingested = ingest_threads(&mut state, &[t], at(1, 1));
        assert_eq!(ingested.actions.len(), 1);
        assert_eq!(ingested.actions[0].kind, ActionKind::Gather);
        assert_eq!(ingested.actions[0].player_id, "4");
    }

    #[test]
    fn test_window_start_is_a_day_back() {
        assert_eq!(window_start(at(2, 12)), at(1, 12));
    }
}
