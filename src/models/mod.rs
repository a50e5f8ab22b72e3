//! Data models for the Sudoku game API.
//!
//! This module contains the data structures used to represent server
//! responses:
//!
//! - `UserProfile`, `AuthSession`: accounts and login results
//! - `Puzzle`, `Difficulty`: the puzzle catalog
//! - `GameRecord`, `GameMode`: per-game history rows
//! - `LeaderboardEntry`, `LeaderboardSort`: public rankings

pub mod game;
pub mod leaderboard;
pub mod puzzle;
pub mod user;

pub use game::{GameMode, GameRecord};
pub use leaderboard::{LeaderboardEntry, LeaderboardSort};
pub use puzzle::{Difficulty, Puzzle};
pub use user::{AuthSession, UserProfile};
