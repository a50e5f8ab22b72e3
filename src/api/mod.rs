//! HTTP client module for the Sudoku game server.
//!
//! This module provides the `ApiClient` for credential exchange and for
//! fetching puzzles, leaderboard rankings, and profile statistics, plus
//! the shared `AuthBinding` that attaches the session's bearer token to
//! every outbound request.

pub mod binding;
pub mod client;
pub mod error;

pub use binding::AuthBinding;
pub use client::ApiClient;
pub use error::ApiError;
