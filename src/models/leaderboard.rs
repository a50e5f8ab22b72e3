use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::Difficulty;

/// Ranking order accepted by the leaderboard endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderboardSort {
    /// Highest score first.
    #[default]
    Score,
    /// Fastest completion first.
    Time,
}

impl LeaderboardSort {
    /// Value of the `type` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            LeaderboardSort::Score => "score",
            LeaderboardSort::Time => "time",
        }
    }

    /// Parse a sort order as typed on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "score" => Some(LeaderboardSort::Score),
            "time" => Some(LeaderboardSort::Time),
            _ => None,
        }
    }
}

/// One ranked row of the public leaderboard.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub time_seconds: i64,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}
