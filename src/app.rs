//! Application state and command handling.
//!
//! This module contains the `App` struct that owns the configuration, the
//! session controller, and the API client. All navigation goes through
//! the route guard and all session mutation goes through the controller;
//! view code only reads session state and server data.

use std::io::{self, Write};

use anyhow::Result;
use tracing::{debug, error, warn};

use crate::api::{ApiClient, ApiError, AuthBinding};
use crate::auth::{Identity, KeyringTokenStore, Session, SessionController, SessionStatus};
use crate::config::Config;
use crate::models::{AuthSession, Difficulty, GameRecord, LeaderboardEntry, LeaderboardSort};
use crate::routes::{decide, Decision, Route};
use crate::utils::{format_date, format_time};

/// Maximum username length accepted at the prompt.
/// Matches the column width the server stores.
const MAX_USERNAME_LENGTH: usize = 50;

pub struct App {
    pub config: Config,
    pub controller: SessionController,
    pub api: ApiClient,
    pub route: Route,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let auth = AuthBinding::new();
        let api = ApiClient::new(config.base_url(), auth.clone())?;
        let controller = SessionController::new(Box::new(KeyringTokenStore), auth);

        Ok(Self {
            config,
            controller,
            api,
            route: Route::Home,
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move to a route, applying the guard's decision. Returns the route
    /// actually reached, which differs from the request on a redirect.
    pub fn navigate(&mut self, requested: Route) -> Route {
        let session = self.controller.current();
        self.route = match decide(requested.policy(), &session) {
            Decision::Render => requested,
            Decision::RedirectLogin => {
                debug!(route = requested.path(), "Redirecting to login");
                Route::Login
            }
            Decision::RedirectHome => {
                debug!(route = requested.path(), "Redirecting home");
                Route::Home
            }
        };
        self.route
    }

    /// Navigate to a route and render the resulting view.
    pub async fn goto(&mut self, requested: Route) -> Result<()> {
        let rendered = self.navigate(requested);
        if rendered != requested {
            println!("Redirected to {}.", rendered.path());
        }
        println!("── {} ──", rendered.title());
        match rendered {
            Route::Home => self.render_home(),
            Route::Login => println!("Use the `login` command to sign in."),
            Route::Register => println!("Use the `register` command to create an account."),
            Route::Game => self.render_game().await?,
            Route::Leaderboard => {
                self.render_leaderboard(None, LeaderboardSort::default())
                    .await?
            }
            Route::Profile => self.render_profile().await?,
        }
        Ok(())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Prompt for credentials and establish a session.
    pub async fn login(&mut self) -> Result<()> {
        if self.controller.status() == SessionStatus::Authenticated {
            println!("Already signed in. Use `logout` first.");
            return Ok(());
        }

        let username = self.prompt_username()?;
        let password = rpassword::prompt_password("Password: ")?;
        anyhow::ensure!(!password.is_empty(), "Username and password required");

        let auth = match self.api.login(&username, &password).await {
            Ok(auth) => auth,
            Err(e) => {
                error!(error = %e, "Login failed");
                anyhow::bail!("{}", login_error_message(&e));
            }
        };

        self.establish(auth)
    }

    /// Prompt for account details, register, and establish a session.
    pub async fn register(&mut self) -> Result<()> {
        if self.controller.status() == SessionStatus::Authenticated {
            println!("Already signed in. Use `logout` first.");
            return Ok(());
        }

        let username = self.prompt_username()?;
        let email = prompt_line("Email: ")?;
        anyhow::ensure!(!email.is_empty(), "An email address is required");
        let password = rpassword::prompt_password("Password: ")?;
        anyhow::ensure!(!password.is_empty(), "A password is required");

        let auth = match self.api.register(&username, &email, &password).await {
            Ok(auth) => auth,
            Err(e) => {
                error!(error = %e, "Registration failed");
                anyhow::bail!("{}", login_error_message(&e));
            }
        };

        self.establish(auth)
    }

    /// Apply a successful credential exchange: remember the username,
    /// hand the session to the controller, and land on the home view.
    fn establish(&mut self, auth: AuthSession) -> Result<()> {
        self.config.last_username = Some(auth.user.username.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        let name = auth.user.username.clone();
        self.controller.login(Identity::from(auth.user), auth.token)?;
        self.navigate(Route::Home);
        println!("Signed in as {}.", name);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        if self.controller.status() != SessionStatus::Authenticated {
            println!("Not signed in.");
            return Ok(());
        }
        self.controller.logout()?;
        self.navigate(Route::Home);
        println!("Signed out.");
        Ok(())
    }

    /// React to a 401 from a downstream request: the stored token is
    /// stale, so drop the session and send the user to the login view.
    fn handle_unauthorized(&mut self) -> Result<()> {
        warn!("Server rejected the session token, signing out");
        println!("Your session has expired. Please sign in again.");
        self.controller.logout()?;
        self.navigate(Route::Login);
        Ok(())
    }

    fn prompt_username(&self) -> Result<String> {
        match &self.config.last_username {
            Some(last) => print!("Username [{}]: ", last),
            None => print!("Username: "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            return self
                .config
                .last_username
                .clone()
                .ok_or_else(|| anyhow::anyhow!("A username is required"));
        }
        anyhow::ensure!(input.len() <= MAX_USERNAME_LENGTH, "Username too long");
        Ok(input.to_string())
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn print_greeting(&self) {
        match self.controller.current() {
            Session::Authenticated { identity, .. } => {
                println!("Signed in as {}.", identity.display_name());
            }
            _ => println!("Not signed in. Use `login` or `register` to get started."),
        }
    }

    pub fn whoami(&self) {
        match self.controller.current() {
            Session::Authenticated { identity, .. } if identity.is_resolved() => {
                println!(
                    "Signed in as {} (user #{}).",
                    identity.display_name(),
                    identity.user_id.unwrap_or_default()
                );
            }
            Session::Authenticated { .. } => {
                println!("Signed in with a restored session; run `profile` to resolve the account.");
            }
            Session::Anonymous => println!("Not signed in."),
            Session::Bootstrapping => println!("Session is still initializing."),
        }
    }

    fn render_home(&self) {
        println!("Welcome to Sudoku! Puzzles of varying difficulty, scored and ranked.");
        if self.controller.current().is_authenticated() {
            println!("Try `go game` for a puzzle, or `profile` to review your games.");
        } else {
            println!("Browse `leaderboard` freely; `login` or `register` to play for points.");
        }
    }

    async fn render_game(&mut self) -> Result<()> {
        let puzzles = self.api.fetch_puzzles(None, Some(1)).await?;
        match puzzles.first() {
            Some(puzzle) => {
                println!("Puzzle #{} ({})", puzzle.id, puzzle.difficulty);
                print_grid(&puzzle.starting_grid);
            }
            None => println!("No puzzles available."),
        }
        Ok(())
    }

    pub async fn leaderboard_command(
        &mut self,
        difficulty: Option<Difficulty>,
        sort: LeaderboardSort,
    ) -> Result<()> {
        self.navigate(Route::Leaderboard);
        self.render_leaderboard(difficulty, sort).await
    }

    async fn render_leaderboard(
        &mut self,
        difficulty: Option<Difficulty>,
        sort: LeaderboardSort,
    ) -> Result<()> {
        let entries = self.api.fetch_leaderboard(difficulty, sort).await?;
        print_leaderboard(&entries, sort);
        Ok(())
    }

    async fn render_profile(&mut self) -> Result<()> {
        let profile = match self.api.fetch_profile().await {
            Ok(profile) => profile,
            Err(e) if is_unauthorized(&e) => return self.handle_unauthorized(),
            Err(e) => return Err(e),
        };

        println!("User:          {}", profile.username);
        println!("Member since:  {}", format_date(profile.created_at.as_ref()));
        println!("Total points:  {}", profile.total_points);
        println!("Games played:  {}", profile.games_played);
        println!("Average score: {}", profile.average_score());

        // A restored session learns which account it belongs to here
        self.controller.resolve_identity(profile.into());

        let history = match self.api.fetch_game_history().await {
            Ok(history) => history,
            Err(e) if is_unauthorized(&e) => return self.handle_unauthorized(),
            Err(e) => return Err(e),
        };
        print_history(&history);
        Ok(())
    }

    pub async fn show_puzzles(
        &mut self,
        difficulty: Option<Difficulty>,
        limit: Option<usize>,
    ) -> Result<()> {
        let puzzles = self.api.fetch_puzzles(difficulty, limit).await?;
        if puzzles.is_empty() {
            println!("No puzzles available.");
            return Ok(());
        }
        for puzzle in &puzzles {
            println!(
                "#{:<5} {:<8} {:>2} givens  added {}",
                puzzle.id,
                puzzle.difficulty,
                puzzle.given_count(),
                format_date(puzzle.created_at.as_ref())
            );
        }
        Ok(())
    }
}

/// Map a failed credential exchange to a message worth showing the user.
fn login_error_message(e: &anyhow::Error) -> String {
    if let Some(api) = e.downcast_ref::<ApiError>() {
        return match api {
            ApiError::Unauthorized => "Invalid username or password".to_string(),
            ApiError::BadRequest(msg) => format!("Rejected by server: {}", msg),
            _ => format!("Login failed: {}", api),
        };
    }
    if let Some(net) = e.downcast_ref::<reqwest::Error>() {
        if net.is_timeout() {
            return "Connection timed out. Please try again.".to_string();
        }
        if net.is_connect() {
            return "Unable to connect to server. Check your internet connection.".to_string();
        }
    }
    format!("Login failed: {:#}", e)
}

fn is_unauthorized(e: &anyhow::Error) -> bool {
    e.downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_unauthorized)
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Print an 81-character grid as a 9x9 board, `.` for empty cells.
fn print_grid(grid: &str) {
    if grid.len() != 81 {
        // Unexpected shape from the server, show it raw
        println!("{}", grid);
        return;
    }
    for (i, row) in grid.as_bytes().chunks(9).enumerate() {
        if i > 0 && i % 3 == 0 {
            println!("------+-------+------");
        }
        let mut line = String::new();
        for (j, &cell) in row.iter().enumerate() {
            if j > 0 && j % 3 == 0 {
                line.push_str("| ");
            }
            line.push(if cell == b'0' { '.' } else { cell as char });
            line.push(' ');
        }
        println!("{}", line.trim_end());
    }
}

fn print_leaderboard(entries: &[LeaderboardEntry], sort: LeaderboardSort) {
    if entries.is_empty() {
        println!("No leaderboard data available");
        return;
    }

    // Leading column follows the ranking order, as in the web client
    let (first, second) = match sort {
        LeaderboardSort::Score => ("Score", "Time"),
        LeaderboardSort::Time => ("Time", "Score"),
    };
    println!(
        "{:<5} {:<16} {:<8} {:>8} {:>8}  Date",
        "Rank", "Player", "Diff", first, second
    );
    for (i, entry) in entries.iter().enumerate() {
        let (a, b) = match sort {
            LeaderboardSort::Score => (entry.score.to_string(), format_time(entry.time_seconds)),
            LeaderboardSort::Time => (format_time(entry.time_seconds), entry.score.to_string()),
        };
        println!(
            "#{:<4} {:<16} {:<8} {:>8} {:>8}  {}",
            i + 1,
            entry.username,
            entry.difficulty,
            a,
            b,
            format_date(entry.completed_at.as_ref())
        );
    }
}

fn print_history(history: &[GameRecord]) {
    println!("Recent games:");
    if history.is_empty() {
        println!("  No games played yet. Start your first game!");
        return;
    }
    println!(
        "  {:<13} {:<6} {:<8} {:>6} {:>6}  Status",
        "Date", "Mode", "Diff", "Score", "Time"
    );
    for game in history {
        let difficulty = game
            .difficulty()
            .map(|d| d.as_str())
            .unwrap_or("-");
        let status = if game.disqualified {
            "disqualified"
        } else if game.completed {
            "completed"
        } else {
            "incomplete"
        };
        println!(
            "  {:<13} {:<6} {:<8} {:>6} {:>6}  {}",
            format_date(game.created_at.as_ref()),
            game.mode,
            difficulty,
            game.score,
            format_time(game.time_seconds),
            status
        );
    }
}
