//! Issue-thread ingestion: character sheets, onboarding and daily intents.

pub mod intent;
pub mod onboarding;
pub mod sheet;
pub mod types;

pub use intent::{latest_qualifying_comment, parse_intent};
pub use onboarding::{ingest_threads, window_start, Ingested};
pub use sheet::{parse_character_sheet, CharacterSheet};
pub use types::{Comment, IssueThread, Notice, ThreadUser};
