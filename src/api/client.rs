//! API client for the Sudoku game server.
//!
//! This module provides the `ApiClient` struct for talking to the game
//! backend: credential exchange, the puzzle catalog, the leaderboard, and
//! profile statistics.
//!
//! Authenticated endpoints rely on the shared `AuthBinding`: the current
//! `Authorization` header is merged into each request when it is built,
//! so call sites never re-read session state themselves.

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::api::{ApiError, AuthBinding};
use crate::models::{
    AuthSession, Difficulty, GameRecord, LeaderboardEntry, LeaderboardSort, Puzzle, UserProfile,
};

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Number of puzzles requested when the caller gives no limit, matching
/// the server's own default page size.
const DEFAULT_PUZZLE_LIMIT: usize = 10;

/// API client for the game server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: AuthBinding,
}

impl ApiClient {
    /// Create a new API client against a base endpoint. The endpoint is
    /// fixed for the lifetime of the client.
    pub fn new(base_url: impl Into<String>, auth: AuthBinding) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        self.auth.apply(&mut headers);
        headers
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers())
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Authentication =====

    /// Exchange a username and password for an account plus bearer token.
    /// Establishing the session from the result is the caller's job.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession> {
        debug!(username, "Sending login request");
        let body = serde_json::json!({ "username": username, "password": password });
        self.post("/login", &body).await
    }

    /// Create an account and return it with a fresh bearer token.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthSession> {
        debug!(username, "Sending register request");
        let body = serde_json::json!({ "username": username, "email": email, "password": password });
        self.post("/register", &body).await
    }

    // ===== Data Fetching Methods =====

    /// Fetch the signed-in user's profile and lifetime statistics.
    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        self.get("/profile").await
    }

    /// Fetch the signed-in user's recent games, newest first.
    pub async fn fetch_game_history(&self) -> Result<Vec<GameRecord>> {
        self.get("/game/history").await
    }

    /// Fetch the public leaderboard, optionally filtered by difficulty.
    pub async fn fetch_leaderboard(
        &self,
        difficulty: Option<Difficulty>,
        sort: LeaderboardSort,
    ) -> Result<Vec<LeaderboardEntry>> {
        self.get(&Self::leaderboard_path(difficulty, sort)).await
    }

    /// Fetch puzzles from the catalog.
    pub async fn fetch_puzzles(
        &self,
        difficulty: Option<Difficulty>,
        limit: Option<usize>,
    ) -> Result<Vec<Puzzle>> {
        self.get(&Self::puzzles_path(difficulty, limit)).await
    }

    fn leaderboard_path(difficulty: Option<Difficulty>, sort: LeaderboardSort) -> String {
        let mut path = format!("/leaderboard?type={}", sort.as_query());
        if let Some(difficulty) = difficulty {
            path.push_str("&difficulty=");
            path.push_str(difficulty.as_str());
        }
        path
    }

    fn puzzles_path(difficulty: Option<Difficulty>, limit: Option<usize>) -> String {
        let mut path = format!("/puzzles?limit={}", limit.unwrap_or(DEFAULT_PUZZLE_LIMIT));
        if let Some(difficulty) = difficulty {
            path.push_str("&difficulty=");
            path.push_str(difficulty.as_str());
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let auth = AuthBinding::new();
        let client = ApiClient::new("http://localhost:8080/", auth).unwrap();
        assert_eq!(client.url("/leaderboard"), "http://localhost:8080/leaderboard");
    }

    #[test]
    fn test_query_paths() {
        // The query strings must match what the server's handlers parse.
        assert_eq!(
            ApiClient::leaderboard_path(Some(Difficulty::Hard), LeaderboardSort::Time),
            "/leaderboard?type=time&difficulty=hard"
        );
        assert_eq!(
            ApiClient::leaderboard_path(None, LeaderboardSort::Score),
            "/leaderboard?type=score"
        );
        assert_eq!(
            ApiClient::puzzles_path(Some(Difficulty::Easy), Some(3)),
            "/puzzles?limit=3&difficulty=easy"
        );
        assert_eq!(ApiClient::puzzles_path(None, None), "/puzzles?limit=10");
    }

    #[test]
    fn test_requests_carry_installed_header() {
        let auth = AuthBinding::new();
        let client = ApiClient::new("http://localhost:8080", auth.clone()).unwrap();

        assert!(client.auth_headers().get(header::AUTHORIZATION).is_none());

        auth.set_token("abc123").unwrap();
        let headers = client.auth_headers();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap().as_bytes(),
            b"Bearer abc123"
        );

        // Clearing the binding is observed by the next request build.
        auth.clear_token();
        assert!(client.auth_headers().get(header::AUTHORIZATION).is_none());
    }
}
