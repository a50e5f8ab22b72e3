//! Sudoku command-line client.
//!
//! Connects to the Sudoku game server, restores any saved session from
//! the OS keychain, and provides a small command loop for signing in,
//! playing with the puzzle catalog, browsing the leaderboard, and
//! reviewing profile statistics.

mod api;
mod app;
mod auth;
mod config;
mod models;
mod routes;
mod utils;

use std::io::{self, Write};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use auth::Session;
use models::{Difficulty, LeaderboardSort};
use routes::Route;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Sudoku client starting");

    let mut app = App::new()?;
    println!("Sudoku - connecting to {}", app.config.base_url());
    println!("Initializing session ...");

    // No route renders until the session resolves; an unreadable store
    // falls back to a signed-out session rather than blocking startup.
    if let Err(e) = app.controller.bootstrap() {
        warn!(error = %e, "Bootstrap failed");
        eprintln!("Warning: could not read the saved session; starting signed out.");
    }
    app.print_greeting();

    run_loop(&mut app).await?;

    info!("Sudoku client exiting");
    Ok(())
}

async fn run_loop(app: &mut App) -> Result<()> {
    let mut session_watch = app.controller.subscribe();
    render_navbar(&app.controller.current());

    let stdin = io::stdin();
    loop {
        print!("{}> ", app.route.path());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            // EOF
            return Ok(());
        }

        match handle_command(app, line.trim()).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => println!("Error: {:#}", e),
        }

        // Re-render the navigation line whenever the session changed, the
        // way the web client's navbar follows its auth context.
        if session_watch.has_changed().unwrap_or(false) {
            render_navbar(&session_watch.borrow_and_update());
        }
    }
}

/// Print the navigation links available to the current session.
fn render_navbar(session: &Session) {
    match session {
        Session::Authenticated { identity, .. } => println!(
            "[{}] home | leaderboard | game | profile | logout",
            identity.display_name()
        ),
        _ => println!("[guest] home | leaderboard | login | register"),
    }
}

async fn handle_command(app: &mut App, line: &str) -> Result<bool> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(false);
    };

    match command {
        "help" | "?" => print_help(),
        "quit" | "exit" => return Ok(true),
        "go" => match parts.next() {
            Some(arg) => match Route::parse(arg) {
                Some(route) => app.goto(route).await?,
                None => println!("Unknown route {:?}. Routes: {}", arg, route_list()),
            },
            None => println!("Usage: go <route>   (routes: {})", route_list()),
        },
        "login" => app.login().await?,
        "register" => app.register().await?,
        "logout" => app.logout()?,
        "leaderboard" => {
            let (difficulty, sort) = parse_leaderboard_args(parts)?;
            app.leaderboard_command(difficulty, sort).await?;
        }
        "profile" => app.goto(Route::Profile).await?,
        "puzzles" => {
            let (difficulty, limit) = parse_puzzle_args(parts)?;
            app.show_puzzles(difficulty, limit).await?;
        }
        "whoami" => app.whoami(),
        _ => println!("Unknown command {:?}. Try `help`.", command),
    }
    Ok(false)
}

fn parse_leaderboard_args<'a>(
    args: impl Iterator<Item = &'a str>,
) -> Result<(Option<Difficulty>, LeaderboardSort)> {
    let mut difficulty = None;
    let mut sort = LeaderboardSort::default();
    for arg in args {
        if let Some(d) = Difficulty::parse(arg) {
            difficulty = Some(d);
        } else if let Some(s) = LeaderboardSort::parse(arg) {
            sort = s;
        } else {
            anyhow::bail!(
                "Unknown leaderboard filter {:?} (use easy/medium/hard and score/time)",
                arg
            );
        }
    }
    Ok((difficulty, sort))
}

fn parse_puzzle_args<'a>(
    args: impl Iterator<Item = &'a str>,
) -> Result<(Option<Difficulty>, Option<usize>)> {
    let mut difficulty = None;
    let mut limit = None;
    for arg in args {
        if let Some(d) = Difficulty::parse(arg) {
            difficulty = Some(d);
        } else if let Ok(n) = arg.parse::<usize>() {
            limit = Some(n);
        } else {
            anyhow::bail!(
                "Unknown puzzle filter {:?} (use easy/medium/hard or a count)",
                arg
            );
        }
    }
    Ok((difficulty, limit))
}

fn route_list() -> String {
    Route::ALL
        .iter()
        .map(|r| r.path())
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_help() {
    println!("Commands:");
    println!("  go <route>                     navigate (routes: {})", route_list());
    println!("  login / register / logout      manage the session");
    println!("  leaderboard [diff] [score|time] show rankings");
    println!("  profile                        show stats and game history");
    println!("  puzzles [diff] [count]         list puzzles from the catalog");
    println!("  whoami                         show session state");
    println!("  quit                           exit");
}
