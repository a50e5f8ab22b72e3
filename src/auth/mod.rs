//! Session and credential management.
//!
//! This module provides:
//! - `TokenStore` / `KeyringTokenStore`: durable storage for the bearer token
//! - `Session` / `SessionController`: the session state machine and its
//!   single writer
//!
//! The controller is the only code that writes the token store and the
//! request authorization binding; view code reads session state through
//! `current()` or a `subscribe()` watch handle.

pub mod credentials;
pub mod session;

pub use credentials::{KeyringTokenStore, TokenStore};
pub use session::{Identity, Session, SessionController, SessionStatus};
