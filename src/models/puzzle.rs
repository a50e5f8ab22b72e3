use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Puzzle difficulty levels supported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Wire value, as used in query strings and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a difficulty as typed on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Sudoku puzzle from the server catalog.
///
/// Grids are 81-character strings in row-major order with `0` marking an
/// empty cell. The solution is filled in server-side and may be withheld.
#[derive(Debug, Clone, Deserialize)]
pub struct Puzzle {
    pub id: u64,
    pub difficulty: Difficulty,
    pub starting_grid: String,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Puzzle {
    /// Number of pre-filled cells in the starting grid.
    pub fn given_count(&self) -> usize {
        self.starting_grid
            .chars()
            .filter(|c| c.is_ascii_digit() && *c != '0')
            .count()
    }
}
