use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Difficulty, Puzzle};

/// Whether a game counted for scoring or was a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Play,
    Learn,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameMode::Play => "play",
            GameMode::Learn => "learn",
        })
    }
}

/// One row of the player's game history.
#[derive(Debug, Clone, Deserialize)]
pub struct GameRecord {
    pub id: u64,
    pub mode: GameMode,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub time_seconds: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub disqualified: bool,
    #[serde(default)]
    pub puzzle: Option<Puzzle>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl GameRecord {
    /// Difficulty of the puzzle this game was played on, if the server
    /// embedded it.
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.puzzle.as_ref().map(|p| p.difficulty)
    }
}
