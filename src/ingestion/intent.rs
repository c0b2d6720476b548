//! Turning comment text into actions.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::types::Comment;
use crate::world::{Action, ActionKind, Location, LocationId, Resource};

/// Parses the first line of a comment into an action.
///
/// The verb is case-insensitive. GATHER takes a resource name, EXPLORE and
/// ATTACK take a location id that must exist in `locations`. Anything else,
/// including a missing or unknown target, becomes WAIT.
pub fn parse_intent(
    player_id: &str,
    body: &str,
    locations: &BTreeMap<LocationId, Location>,
) -> Action {
    let line = body.trim().lines().next().unwrap_or_default();
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().unwrap_or_default().to_ascii_uppercase();
    let target = tokens.next();

    let action = match (verb.as_str(), target) {
        ("GATHER", Some(t)) => Resource::parse(t).map(|r| Action::gather(player_id, r)),
        ("EXPLORE", Some(t)) if locations.contains_key(t) => Some(Action::explore(player_id, t)),
        ("ATTACK", Some(t)) if locations.contains_key(t) => Some(Action::attack(player_id, t)),
        _ => None,
    };

    action.unwrap_or_else(|| {
        if verb != ActionKind::Wait.name() {
            tracing::debug!(player = player_id, line, "unparseable intent, waiting");
        }
        Action::wait(player_id)
    })
}

/// The newest comment made after `since` by the thread owner, ignoring bots.
pub fn latest_qualifying_comment<'a>(
    comments: &'a [Comment],
    owner_id: u64,
    since: DateTime<Utc>,
) -> Option<&'a Comment> {
    comments
        .iter()
        .filter(|c| c.created_at > since)
        .filter(|c| c.user.id == owner_id && !c.user.is_bot())
        .max_by_key(|c| c.created_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::types::ThreadUser;
    use crate::world::WorldState;
    use chrono::{Duration, TimeZone};

    fn locations() -> BTreeMap<LocationId, Location> {
        WorldState::initial().locations
    }

    fn comment(user_id: u64, kind: &str, body: &str, hour: u32) -> Comment {
        Comment {
            body: body.to_string(),
            user: ThreadUser {
                login: format!("user{user_id}"),
                id: user_id,
                kind: kind.to_string(),
            },
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_parse_verbs_case_insensitive() {
        let locs = locations();
        assert_eq!(
            parse_intent("7", "gather Wood", &locs),
            Action::gather("7", Resource::Wood)
        );
        assert_eq!(
            parse_intent("7", "  Explore monsters_base\nignored", &locs),
            Action::explore("7", "monsters_base")
        );
        assert_eq!(
            parse_intent("7", "ATTACK red_base", &locs),
            Action::attack("7", "red_base")
        );
    }

    #[test]
    fn test_invalid_intents_wait() {
        let locs = locations();
        for body in [
            "",
            "GATHER",
            "GATHER stone",
            "EXPLORE atlantis",
            "ATTACK",
            "MOVE forest",
            "hello\nGATHER food",
        ] {
            assert_eq!(parse_intent("7", body, &locs), Action::wait("7"), "{body:?}");
        }
    }

    #[test]
    fn test_location_ids_are_exact() {
        let locs = locations();
        assert_eq!(parse_intent("7", "EXPLORE RED_BASE", &locs), Action::wait("7"));
    }

    #[test]
    fn test_latest_comment_filters_owner_bots_and_window() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
        let comments = vec![
            comment(1, "User", "GATHER food", 1),
            comment(1, "User", "GATHER wood", 3),
            comment(2, "User", "ATTACK red_base", 4),
            comment(1, "Bot", "WAIT", 5),
        ];
        let latest = latest_qualifying_comment(&comments, 1, since).unwrap();
        assert_eq!(latest.body, "GATHER wood");

        let later = since + Duration::hours(10);
        assert!(latest_qualifying_comment(&comments, 1, later).is_none());
    }
}
