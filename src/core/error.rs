//! Errors raised while resolving a single action.

use thiserror::Error;

/// A resolver could not run. The tick logs it and moves on to the next
/// action; world state touched by the failed action is left as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown player {0}")]
    UnknownPlayer(String),

    #[error("player {player} belongs to missing clan {clan}")]
    MissingClan { player: String, clan: String },

    #[error("active boss {0} has no rule")]
    UnknownBoss(String),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
