//! Daily world and location narration.

pub mod input;
pub mod narrator;

pub use input::{
    build_location_input, build_world_input, BossEventInput, BossStatus, LocationEventInput,
    LocationNarrationInput, ModifierEventInput, WorldNarrationInput,
};
pub use narrator::{
    narrate_location_or_fallback, narrate_world_or_fallback, GeminiNarrator, NarrationError,
    Narrator, NullNarrator, LOCATION_FALLBACK, WORLD_FALLBACK,
};
