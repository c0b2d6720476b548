//! Integration test: from issue threads to narration
//!
//! Feeds raw thread JSON through onboarding and intent parsing, runs the
//! tick on the result and builds narration inputs from the two snapshots.

use chrono::{DateTime, Utc};

use clanquest::core::{tick, ScriptedDice};
use clanquest::ingestion::{ingest_threads, window_start, IssueThread};
use clanquest::narration::{
    build_location_input, build_world_input, narrate_location_or_fallback,
    narrate_world_or_fallback, LocationEventInput, NullNarrator, LOCATION_FALLBACK,
    WORLD_FALLBACK,
};
use clanquest::queries::look;
use clanquest::rules::RuleBook;
use clanquest::world::{ActionKind, PlayerClass, Resource, WorldState};

const THREADS: &str = r###"[
  {
    "number": 1,
    "user": { "login": "aria", "id": 101, "type": "User" },
    "title": "[Character] Aria",
    "body": "## Character Name\nAria\n## Class\n- [x] Archer\n## Optional Backstory\nRaised by eagles.",
    "created_at": "2024-03-01T08:00:00Z",
    "comments": [
      { "body": "gather food", "user": { "login": "aria", "id": 101, "type": "User" }, "created_at": "2024-03-02T07:00:00Z" },
      { "body": "Welcome!", "user": { "login": "quest-bot", "id": 1, "type": "Bot" }, "created_at": "2024-03-02T07:30:00Z" }
    ]
  },
  {
    "number": 2,
    "user": { "login": "bram", "id": 102, "type": "User" },
    "title": "How do I play?",
    "body": "",
    "created_at": "2024-03-01T09:00:00Z",
    "comments": [
      { "body": "EXPLORE nowhere", "user": { "login": "bram", "id": 102, "type": "User" }, "created_at": "2024-03-02T06:00:00Z" }
    ]
  },
  {
    "number": 3,
    "user": { "login": "aria", "id": 101, "type": "User" },
    "title": "Another one",
    "body": "",
    "created_at": "2024-03-01T10:00:00Z",
    "comments": []
  }
]"###;

fn now() -> DateTime<Utc> {
    "2024-03-02T12:00:00Z".parse().unwrap()
}

#[test]
fn test_threads_to_tick() {
    let threads: Vec<IssueThread> = serde_json::from_str(THREADS).unwrap();
    let mut world = WorldState::initial();

    let ingested = ingest_threads(&mut world, &threads, window_start(now()));

    assert_eq!(ingested.duplicates, vec![3]);
    assert_eq!(world.players.len(), 2);
    let aria = &world.players["1"];
    assert_eq!(aria.class, PlayerClass::Archer);
    assert_eq!(aria.backstory, "Raised by eagles.");
    assert_eq!(world.players["2"].class, PlayerClass::Adventurer);
    assert_ne!(aria.clan_id, world.players["2"].clan_id);

    assert_eq!(ingested.actions.len(), 2);
    assert_eq!(ingested.actions[0].kind, ActionKind::Gather);
    assert_eq!(ingested.actions[0].target.as_deref(), Some(Resource::Food.name()));
    // Unknown location falls back to waiting
    assert_eq!(ingested.actions[1].kind, ActionKind::Wait);

    let rules = RuleBook::builtin().unwrap();
    let mut dice = ScriptedDice::new(vec![10]);
    let result = tick(&rules, &world, &ingested.actions, &mut dice);

    let aria_after = &result.state.players["1"];
    assert_eq!(aria_after.stats.gather_food_count, 1);
    assert_eq!(aria_after.history.len(), 1);
    assert_eq!(
        result.state.players["2"].message_text(),
        "You take a moment to observe your surroundings."
    );
    assert!(result.narrative_summary.contains("2 adventurers acted today."));

    let text = look(&result.state, "1");
    assert!(text.contains("**Aria** the Archer"));
}

#[test]
fn test_narration_after_tick() {
    let threads: Vec<IssueThread> = serde_json::from_str(THREADS).unwrap();
    let mut world = WorldState::initial();
    let ingested = ingest_threads(&mut world, &threads, window_start(now()));

    let rules = RuleBook::builtin().unwrap();
    let mut dice = ScriptedDice::new(vec![10]);
    let result = tick(&rules, &world, &ingested.actions, &mut dice);

    let world_input = build_world_input(&result.state);
    assert_eq!(world_input.day, 1);
    assert_eq!(world_input.population, 2);
    assert_eq!(narrate_world_or_fallback(&NullNarrator, &world_input), WORLD_FALLBACK);

    // Aria's clan gained 10 food from gathering and 5 from its daily bonus
    let clan_id = &result.state.players["1"].clan_id;
    let home = result.state.home_of(clan_id).unwrap();
    let input = build_location_input(&world, &result.state, home);
    assert_eq!(input.population, 1);
    assert!(input.events.iter().any(|e| matches!(
        e,
        LocationEventInput::ResourceSurge {
            resource: Resource::Food,
            amount: 15
        }
    )));
    assert_eq!(narrate_location_or_fallback(&NullNarrator, &input), LOCATION_FALLBACK);
}
