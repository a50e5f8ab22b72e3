//! Session lifecycle and state.
//!
//! The session is the process-wide record of whether, and as whom, the
//! user is signed in. `SessionController` owns it and is the single
//! writer of the credential store, the authorization header binding, and
//! the in-memory state, so the three can never drift apart. Views read
//! the session through `current()` or a `subscribe()` handle and mutate
//! it only via `login`/`logout`.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::AuthBinding;
use crate::auth::TokenStore;
use crate::models::UserProfile;

/// The signed-in user as known to this client.
///
/// A session restored from a stored token starts with no resolved fields;
/// they are filled in once a profile fetch identifies the account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<u64>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Name shown in the prompt and navigation bar.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("player")
    }

    /// Whether the account behind the token is known yet.
    pub fn is_resolved(&self) -> bool {
        self.user_id.is_some()
    }
}

impl From<UserProfile> for Identity {
    fn from(user: UserProfile) -> Self {
        Identity {
            user_id: Some(user.id),
            username: Some(user.username),
            email: user.email,
        }
    }
}

/// Session state machine.
///
/// The bearer token only exists inside the `Authenticated` variant, so a
/// token can never outlive the session that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Startup state, before the stored token has been checked.
    Bootstrapping,
    Anonymous,
    Authenticated { identity: Identity, token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Bootstrapping,
    Anonymous,
    Authenticated,
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        match self {
            Session::Bootstrapping => SessionStatus::Bootstrapping,
            Session::Anonymous => SessionStatus::Anonymous,
            Session::Authenticated { .. } => SessionStatus::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    /// The bearer token, present iff authenticated.
    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated { token, .. } => Some(token.as_str()),
            _ => None,
        }
    }
}

/// Owner and single writer of the session, the credential store, and the
/// authorization header binding.
pub struct SessionController {
    store: Box<dyn TokenStore>,
    auth: AuthBinding,
    /// Serializes bootstrap/login/logout. The store and the header
    /// binding are only written while this lock is held.
    write_lock: Mutex<()>,
    session: watch::Sender<Session>,
}

impl SessionController {
    pub fn new(store: Box<dyn TokenStore>, auth: AuthBinding) -> Self {
        let (session, _) = watch::channel(Session::Bootstrapping);
        Self {
            store,
            auth,
            write_lock: Mutex::new(()),
            session,
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.borrow().status()
    }

    /// Watch for session transitions. Every bootstrap/login/logout
    /// publishes the new session to all subscribers.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Restore the session from the credential store.
    ///
    /// Runs once at startup, before any route is rendered. A stored token
    /// is trusted without a network round-trip; if it turns out stale, the
    /// first authenticated request fails with 401 and the caller reacts
    /// then. A store read failure resolves the session to `Anonymous` and
    /// returns the error, so startup is never stuck waiting on it.
    pub fn bootstrap(&self) -> Result<()> {
        let _guard = self.lock_writes();

        if !matches!(*self.session.borrow(), Session::Bootstrapping) {
            debug!("Bootstrap called after session already resolved");
            return Ok(());
        }

        let token = match self.store.read() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Credential store unreadable, starting anonymous");
                self.session.send_replace(Session::Anonymous);
                return Err(e);
            }
        };

        let Some(token) = token else {
            debug!("No stored token");
            self.session.send_replace(Session::Anonymous);
            return Ok(());
        };

        match self.auth.set_token(&token) {
            Ok(()) => {
                self.session.send_replace(Session::Authenticated {
                    identity: Identity::default(),
                    token,
                });
                info!("Session restored from stored token");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Stored token is not header-safe, starting anonymous");
                self.session.send_replace(Session::Anonymous);
                Err(e).context("Stored token is unusable")
            }
        }
    }

    /// Establish a session from an `(identity, token)` pair already
    /// obtained from the server.
    ///
    /// Persists the token, installs the authorization header, then
    /// publishes the new session. A store write failure aborts the whole
    /// action and leaves the previous state intact. Calling this while
    /// already signed in replaces identity and token.
    pub fn login(&self, identity: Identity, token: String) -> Result<()> {
        let _guard = self.lock_writes();

        let header = AuthBinding::encode(&token).context("Token is not header-safe")?;
        self.store
            .save(&token)
            .context("Failed to persist session token")?;
        self.auth.install(header);
        info!(user = identity.display_name(), "Signed in");
        self.session
            .send_replace(Session::Authenticated { identity, token });
        Ok(())
    }

    /// End the session: clear the stored token, drop the authorization
    /// header, and publish the anonymous state.
    ///
    /// Idempotent - calling this while already anonymous is a no-op. A
    /// store failure aborts the action with the state unchanged, so the
    /// store, the binding, and the session stay consistent.
    pub fn logout(&self) -> Result<()> {
        let _guard = self.lock_writes();

        if matches!(*self.session.borrow(), Session::Anonymous) {
            debug!("Logout with no active session");
            return Ok(());
        }

        self.store.clear().context("Failed to clear stored token")?;
        self.auth.clear_token();
        self.session.send_replace(Session::Anonymous);
        info!("Signed out");
        Ok(())
    }

    /// Replace the identity on an authenticated session, leaving the
    /// token untouched. Used when a restored session first learns which
    /// account it belongs to. No-op while signed out.
    pub fn resolve_identity(&self, identity: Identity) {
        let _guard = self.lock_writes();

        self.session.send_if_modified(|session| {
            if let Session::Authenticated {
                identity: current, ..
            } = session
            {
                if *current != identity {
                    *current = identity;
                    return true;
                }
            }
            false
        });
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::MemoryTokenStore;

    /// Store whose reads fail, as when the keychain is locked.
    struct UnreadableStore;

    impl TokenStore for UnreadableStore {
        fn save(&self, _token: &str) -> Result<()> {
            anyhow::bail!("keychain unavailable")
        }
        fn read(&self) -> Result<Option<String>> {
            anyhow::bail!("keychain unavailable")
        }
        fn clear(&self) -> Result<()> {
            anyhow::bail!("keychain unavailable")
        }
    }

    /// Store that accepts writes but refuses to clear.
    #[derive(Clone, Default)]
    struct SealedStore(MemoryTokenStore);

    impl TokenStore for SealedStore {
        fn save(&self, token: &str) -> Result<()> {
            self.0.save(token)
        }
        fn read(&self) -> Result<Option<String>> {
            self.0.read()
        }
        fn clear(&self) -> Result<()> {
            anyhow::bail!("keychain unavailable")
        }
    }

    fn controller(store: MemoryTokenStore) -> (SessionController, AuthBinding) {
        let auth = AuthBinding::new();
        let controller = SessionController::new(Box::new(store), auth.clone());
        (controller, auth)
    }

    fn ada() -> Identity {
        Identity {
            user_id: Some(7),
            username: Some("ada".to_string()),
            email: None,
        }
    }

    #[test]
    fn test_bootstrap_restores_stored_token() {
        let store = MemoryTokenStore::with_token("abc123");
        let (controller, auth) = controller(store);

        controller.bootstrap().unwrap();

        let session = controller.current();
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(session.token(), Some("abc123"));
        assert!(!session.identity().unwrap().is_resolved());
        assert_eq!(auth.authorization().unwrap().as_bytes(), b"Bearer abc123");
    }

    #[test]
    fn test_bootstrap_empty_store_is_anonymous() {
        let (controller, auth) = controller(MemoryTokenStore::default());

        controller.bootstrap().unwrap();

        assert_eq!(controller.status(), SessionStatus::Anonymous);
        assert!(!auth.is_installed());
    }

    #[test]
    fn test_bootstrap_store_failure_resolves_anonymous() {
        let auth = AuthBinding::new();
        let controller = SessionController::new(Box::new(UnreadableStore), auth.clone());

        // The error surfaces, but the session must not stay Bootstrapping
        assert!(controller.bootstrap().is_err());
        assert_eq!(controller.status(), SessionStatus::Anonymous);
        assert!(!auth.is_installed());
    }

    #[test]
    fn test_bootstrap_after_resolve_is_noop() {
        let store = MemoryTokenStore::default();
        let (controller, _auth) = controller(store.clone());

        controller.bootstrap().unwrap();
        controller.login(ada(), "tok1".to_string()).unwrap();

        // A second bootstrap must not clobber the live session
        controller.bootstrap().unwrap();
        assert_eq!(controller.current().token(), Some("tok1"));
    }

    #[test]
    fn test_login_logout_keep_derived_state_in_lockstep() {
        let store = MemoryTokenStore::default();
        let (controller, auth) = controller(store.clone());
        controller.bootstrap().unwrap();

        controller.login(ada(), "tok1".to_string()).unwrap();
        assert!(controller.current().is_authenticated());
        assert_eq!(store.stored().as_deref(), Some("tok1"));
        assert!(auth.is_installed());

        controller.logout().unwrap();
        assert_eq!(controller.status(), SessionStatus::Anonymous);
        assert_eq!(store.stored(), None);
        assert!(!auth.is_installed());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let store = MemoryTokenStore::default();
        let (controller, _auth) = controller(store.clone());
        controller.bootstrap().unwrap();
        controller.login(ada(), "tok1".to_string()).unwrap();

        controller.logout().unwrap();
        let after_first = controller.current();

        controller.logout().unwrap();
        assert_eq!(controller.current(), after_first);
        assert_eq!(store.stored(), None);
    }

    #[test]
    fn test_relogin_overwrites_token() {
        let store = MemoryTokenStore::default();
        let (controller, auth) = controller(store.clone());
        controller.bootstrap().unwrap();

        controller.login(ada(), "tok1".to_string()).unwrap();
        let grace = Identity {
            user_id: Some(8),
            username: Some("grace".to_string()),
            email: None,
        };
        controller.login(grace.clone(), "tok2".to_string()).unwrap();

        let session = controller.current();
        assert_eq!(session.token(), Some("tok2"));
        assert_eq!(session.identity(), Some(&grace));
        assert_eq!(store.stored().as_deref(), Some("tok2"));
        assert_eq!(auth.authorization().unwrap().as_bytes(), b"Bearer tok2");
    }

    #[test]
    fn test_login_rejects_header_unsafe_token() {
        let store = MemoryTokenStore::default();
        let (controller, auth) = controller(store.clone());
        controller.bootstrap().unwrap();

        assert!(controller.login(ada(), "bad\ntoken".to_string()).is_err());

        // The failed action must leave nothing behind
        assert_eq!(controller.status(), SessionStatus::Anonymous);
        assert_eq!(store.stored(), None);
        assert!(!auth.is_installed());
    }

    #[test]
    fn test_failed_logout_leaves_state_unchanged() {
        let store = SealedStore::default();
        let inner = store.0.clone();
        let auth = AuthBinding::new();
        let controller = SessionController::new(Box::new(store), auth.clone());
        controller.bootstrap().unwrap();
        controller.login(ada(), "tok1".to_string()).unwrap();

        assert!(controller.logout().is_err());

        // Session, store, and binding still agree with each other
        assert!(controller.current().is_authenticated());
        assert_eq!(inner.stored().as_deref(), Some("tok1"));
        assert!(auth.is_installed());
    }

    #[test]
    fn test_transitions_are_published() {
        let (controller, _auth) = controller(MemoryTokenStore::default());
        let mut watcher = controller.subscribe();

        controller.bootstrap().unwrap();
        assert!(watcher.has_changed().unwrap());
        assert_eq!(
            watcher.borrow_and_update().status(),
            SessionStatus::Anonymous
        );

        controller.login(ada(), "tok1".to_string()).unwrap();
        assert!(watcher.has_changed().unwrap());
        assert!(watcher.borrow_and_update().is_authenticated());

        controller.logout().unwrap();
        assert!(watcher.has_changed().unwrap());
        assert_eq!(
            watcher.borrow_and_update().status(),
            SessionStatus::Anonymous
        );
    }

    #[test]
    fn test_resolve_identity_fills_restored_session() {
        let store = MemoryTokenStore::with_token("abc123");
        let (controller, _auth) = controller(store.clone());
        controller.bootstrap().unwrap();
        assert!(!controller.current().identity().unwrap().is_resolved());

        controller.resolve_identity(ada());

        let session = controller.current();
        assert_eq!(session.identity(), Some(&ada()));
        // Token and store are untouched by identity resolution
        assert_eq!(session.token(), Some("abc123"));
        assert_eq!(store.stored().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_resolve_identity_ignored_when_signed_out() {
        let (controller, _auth) = controller(MemoryTokenStore::default());
        controller.bootstrap().unwrap();

        controller.resolve_identity(ada());
        assert_eq!(controller.status(), SessionStatus::Anonymous);
    }
}
