//! Leaderboard Entity
//!
//! One row per household member; the score counts accepted chore proofs.

use serde::{Deserialize, Serialize};
use super::entity::RecordId;

/// A member's chore score. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Unique identifier
    pub id: RecordId,
    /// Member name, unique across the board
    pub name: String,
    pub score: i64,
}

impl LeaderboardEntry {
    /// Two-letter uppercase avatar text
    pub fn initials(&self) -> String {
        self.name.chars().take(2).collect::<String>().to_uppercase()
    }
}

/// A member row that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaderboardEntry {
    pub name: String,
    pub score: i64,
}

impl NewLeaderboardEntry {
    pub fn new(name: &str, score: i64) -> Self {
        Self {
            name: name.to_string(),
            score,
        }
    }
}
