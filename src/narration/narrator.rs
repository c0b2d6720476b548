//! Narrators turn narration inputs into prose.
//!
//! The engine never reads narration output, so a failed narrator only costs
//! the flavor text. Callers use [`narrate_world_or_fallback`] and
//! [`narrate_location_or_fallback`] to keep going on errors.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::input::{LocationNarrationInput, WorldNarrationInput};

pub const WORLD_FALLBACK: &str = "Unable to generate world summary";
pub const LOCATION_FALLBACK: &str = "Unable to generate location summary";

/// Default text model.
pub const GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("narration request failed: {0}")]
    Request(String),

    #[error("unreadable narration response: {0}")]
    Response(#[from] std::io::Error),

    #[error("narration response had no text")]
    EmptyResponse,

    #[error("failed to encode narration input: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NarrationError>;

pub trait Narrator {
    fn narrate_world(&self, input: &WorldNarrationInput) -> Result<String>;

    fn narrate_location(&self, input: &LocationNarrationInput) -> Result<String>;
}

/// Narrator used when no text service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNarrator;

impl Narrator for NullNarrator {
    fn narrate_world(&self, _input: &WorldNarrationInput) -> Result<String> {
        Ok(WORLD_FALLBACK.to_string())
    }

    fn narrate_location(&self, _input: &LocationNarrationInput) -> Result<String> {
        Ok(LOCATION_FALLBACK.to_string())
    }
}

pub fn narrate_world_or_fallback(narrator: &dyn Narrator, input: &WorldNarrationInput) -> String {
    narrator.narrate_world(input).unwrap_or_else(|e| {
        tracing::warn!(error = %e, day = input.day, "world narration failed");
        WORLD_FALLBACK.to_string()
    })
}

pub fn narrate_location_or_fallback(
    narrator: &dyn Narrator,
    input: &LocationNarrationInput,
) -> String {
    narrator.narrate_location(input).unwrap_or_else(|e| {
        tracing::warn!(error = %e, location = %input.location, "location narration failed");
        LOCATION_FALLBACK.to_string()
    })
}

// ── Prompts ─────────────────────────────────────────────────────

pub fn world_prompt(input: &WorldNarrationInput) -> Result<String> {
    let events = serde_json::to_string_pretty(input)?;
    Ok(format!(
        "You are a fantasy world narrator for a turn-based strategy RPG.\n\
         \n\
         Write a short world log for Day {day}.\n\
         Tone: mythic, neutral, slightly dramatic.\n\
         Length: 2-4 sentences.\n\
         \n\
         Rules:\n\
         - Do NOT invent events.\n\
         - Only describe what appears in the input.\n\
         - If no events occurred, describe a calm or uneventful day.\n\
         - Do NOT mention numbers unless provided.\n\
         - Do NOT mention players directly.\n\
         \n\
         World Events (JSON):\n\
         {events}\n",
        day = input.day,
    ))
}

pub fn location_prompt(input: &LocationNarrationInput) -> Result<String> {
    let events = serde_json::to_string_pretty(input)?;
    Ok(format!(
        "You are narrating events at a single location in a fantasy world.\n\
         \n\
         Location: {location}\n\
         Day: {day}\n\
         \n\
         Write 2-3 sentences describing what happened here.\n\
         \n\
         Rules:\n\
         - Only describe events listed below.\n\
         - If a clan was defeated or conquered, that is the most important event.\n\
         - If resources increased, mention only the largest gain.\n\
         - Do NOT mention population.\n\
         - Do NOT invent battles, weather, or characters.\n\
         \n\
         Location Events (JSON):\n\
         {events}\n",
        location = input.location,
        day = input.day,
    ))
}

// ── Gemini ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Text of the first candidate, trimmed.
fn response_text(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(NarrationError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Narrator backed by the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiNarrator {
    api_key: String,
    model: String,
}

impl GeminiNarrator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: GEMINI_MODEL.to_string(),
        }
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let response: GenerateResponse = ureq::post(&url)
            .set("User-Agent", "clanquest")
            .set("x-goog-api-key", &self.api_key)
            .send_json(body)
            .map_err(|e| NarrationError::Request(e.to_string()))?
            .into_json()?;

        let text = response_text(response)?;
        tracing::debug!(model = %self.model, chars = text.len(), "narration generated");
        Ok(text)
    }
}

impl Narrator for GeminiNarrator {
    fn narrate_world(&self, input: &WorldNarrationInput) -> Result<String> {
        self.generate(&world_prompt(input)?)
    }

    fn narrate_location(&self, input: &LocationNarrationInput) -> Result<String> {
        self.generate(&location_prompt(input)?)
    }
}
