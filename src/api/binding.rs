//! Shared authorization state for outbound requests.
//!
//! `AuthBinding` is the single cell holding the current `Authorization`
//! header. The session controller writes it on bootstrap, login, and
//! logout; the API client reads it when each request is built. Requests
//! issued after a change observe the new state, while requests already in
//! flight keep whichever headers they were dispatched with.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};

/// Process-wide authorization header cell.
/// Clone is cheap - all clones share the same underlying slot.
#[derive(Clone, Default)]
pub struct AuthBinding {
    header: Arc<RwLock<Option<HeaderValue>>>,
}

impl AuthBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the header value for a bearer token. Fails only when the
    /// token contains bytes not allowed in an HTTP header.
    pub fn encode(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        // Keep the token out of Debug output and logs
        value.set_sensitive(true);
        Ok(value)
    }

    /// Install a bearer token for all subsequently issued requests.
    pub fn set_token(&self, token: &str) -> Result<(), InvalidHeaderValue> {
        let value = Self::encode(token)?;
        self.install(value);
        Ok(())
    }

    /// Install a pre-built header value.
    pub fn install(&self, value: HeaderValue) {
        *self.write_slot() = Some(value);
    }

    /// Remove the authorization header from future requests.
    pub fn clear_token(&self) {
        *self.write_slot() = None;
    }

    /// Whether an authorization header is currently installed.
    pub fn is_installed(&self) -> bool {
        self.read_slot().is_some()
    }

    /// Snapshot of the current header value.
    pub fn authorization(&self) -> Option<HeaderValue> {
        self.read_slot().clone()
    }

    /// Merge the current authorization state into a request's headers.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Some(value) = self.read_slot().as_ref() {
            headers.insert(AUTHORIZATION, value.clone());
        }
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, Option<HeaderValue>> {
        self.header.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<HeaderValue>> {
        self.header.write().unwrap_or_else(|e| e.into_inner())
    }
}
