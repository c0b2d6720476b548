//! Shapes of the issue threads the tick ingests.
//!
//! These mirror the subset of the issue tracker's JSON that the game reads.
//! Each open issue is one character; its comments carry the daily intents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadUser {
    pub login: String,
    pub id: u64,
    /// Account type as reported by the tracker, e.g. `User` or `Bot`.
    #[serde(rename = "type", default = "default_user_kind")]
    pub kind: String,
}

fn default_user_kind() -> String {
    "User".to_string()
}

impl ThreadUser {
    pub fn is_bot(&self) -> bool {
        self.kind.eq_ignore_ascii_case("bot")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: String,
    pub user: ThreadUser,
    pub created_at: DateTime<Utc>,
}

/// An open character issue and its comments, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueThread {
    pub number: u64,
    pub user: ThreadUser,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl IssueThread {
    /// Players are keyed by the number of their character issue.
    pub fn player_id(&self) -> String {
        self.number.to_string()
    }
}

/// A reply to post on an issue outside the tick, e.g. a welcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub issue_number: u64,
    pub body: String,
}
