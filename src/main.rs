//! Clanquest command-line entry point.
//!
//! `clanquest tick` runs one day: load the world, ingest the issue threads,
//! advance the tick, save, narrate and report. `look` answers a player's
//! query against the saved world and `init` writes a fresh one.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use clanquest::core::{tick, RandomDice};
use clanquest::ingestion::{ingest_threads, window_start, IssueThread, Notice};
use clanquest::narration::{
    build_location_input, build_world_input, narrate_location_or_fallback,
    narrate_world_or_fallback, GeminiNarrator, Narrator, NullNarrator,
};
use clanquest::queries::look;
use clanquest::rules::RuleBook;
use clanquest::utils::build_info::LONG_VERSION;
use clanquest::utils::persistence::{load_world, save_world, state_path};
use clanquest::world::{Action, WorldState};

/// Clanquest - a clan-based play-by-comment RPG
#[derive(Parser, Debug)]
#[command(name = "clanquest")]
#[command(author, version = LONG_VERSION, about, long_about = None)]
struct Args {
    /// Directory holding gamestate.json
    #[arg(short, long, global = true, env = "GITHUB_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Advance the world by one day
    Tick(TickArgs),

    /// Show what a player sees
    Look {
        /// Player id (the character issue number)
        player: String,
    },

    /// Write a fresh world
    Init {
        /// Overwrite an existing world
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args, Debug)]
struct TickArgs {
    /// Open issue threads with comments (JSON array)
    #[arg(long)]
    threads: Option<PathBuf>,

    /// Extra actions resolved after the ingested ones (JSON array)
    #[arg(long)]
    actions: Option<PathBuf>,

    /// Directory overriding the built-in rule tables
    #[arg(long, env = "CLANQUEST_RULES")]
    rules: Option<PathBuf>,

    /// Dice seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Reference time for the comment window (default: now)
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Gemini key; without it narration uses fixed lines
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Write the replies and narration as JSON here
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct LocationLog {
    location: String,
    text: String,
}

/// Everything a posting job needs after a tick.
#[derive(Debug, Serialize)]
struct TickReport {
    day: u32,
    fingerprint: String,
    narrative_summary: String,
    world_log: String,
    location_logs: Vec<LocationLog>,
    replies: Vec<Notice>,
    duplicates: Vec<u64>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

fn player_replies(state: &WorldState) -> Vec<Notice> {
    state
        .players
        .values()
        .filter(|p| !p.messages.is_empty())
        .filter_map(|p| {
            let issue_number = match p.account.issue_number {
                0 => p.id.parse().ok()?,
                n => n,
            };
            Some(Notice {
                issue_number,
                body: p.message_text(),
            })
        })
        .collect()
}

fn run_tick(workspace: &Path, args: TickArgs) -> Result<()> {
    let TickArgs {
        threads,
        actions,
        rules,
        seed,
        now,
        gemini_api_key,
        report,
    } = args;

    let rules = match rules {
        Some(dir) => RuleBook::from_dir(&dir)?,
        None => RuleBook::builtin()?,
    };
    let mut world = load_world(workspace)?;

    let threads: Vec<IssueThread> = match threads {
        Some(path) => read_json(&path)?,
        None => Vec::new(),
    };
    let since = window_start(now.unwrap_or_else(Utc::now));
    let ingested = ingest_threads(&mut world, &threads, since);

    let mut intents = ingested.actions;
    if let Some(path) = actions {
        let extra: Vec<Action> = read_json(&path)?;
        intents.extend(extra);
    }

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut dice = RandomDice::new(rng);
    let result = tick(&rules, &world, &intents, &mut dice);

    let fingerprint = save_world(workspace, &result.state)?;

    let narrator: Box<dyn Narrator> = match gemini_api_key.filter(|k| !k.is_empty()) {
        Some(key) => Box::new(GeminiNarrator::new(key)),
        None => Box::new(NullNarrator),
    };
    let world_log = narrate_world_or_fallback(narrator.as_ref(), &build_world_input(&result.state));
    let location_logs = result
        .state
        .locations
        .values()
        .map(|location| {
            let input = build_location_input(&world, &result.state, location);
            LocationLog {
                location: location.name.clone(),
                text: narrate_location_or_fallback(narrator.as_ref(), &input),
            }
        })
        .collect();

    let mut replies = ingested.notices;
    replies.extend(player_replies(&result.state));

    let report_data = TickReport {
        day: result.state.day,
        fingerprint,
        narrative_summary: result.narrative_summary,
        world_log,
        location_logs,
        replies,
        duplicates: ingested.duplicates,
    };

    println!("{}", report_data.narrative_summary);
    println!();
    println!("{}", report_data.world_log);
    if let Some(path) = report {
        let json = serde_json::to_string_pretty(&report_data)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Tick(tick_args) => run_tick(&args.workspace, tick_args),
        Commands::Look { player } => {
            let world = load_world(&args.workspace)?;
            println!("{}", look(&world, &player));
            Ok(())
        }
        Commands::Init { force } => {
            let path = state_path(&args.workspace);
            if path.exists() && !force {
                anyhow::bail!("{} already exists; pass --force to overwrite", path.display());
            }
            let fingerprint = save_world(&args.workspace, &WorldState::initial())?;
            println!("{} ({fingerprint})", path.display());
            Ok(())
        }
    }
}
