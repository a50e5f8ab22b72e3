use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name for stored session tokens
const SERVICE_NAME: &str = "sudoku-client";

/// Keychain account under which the bearer token is stored.
/// The store holds exactly one token, so the key is fixed.
const TOKEN_KEY: &str = "session-token";

/// Durable storage for the session's bearer token.
///
/// A missing token on `read` is a normal outcome (`Ok(None)`), not a
/// failure; errors mean the store itself was unavailable.
pub trait TokenStore: Send + Sync {
    fn save(&self, token: &str) -> Result<()>;
    fn read(&self) -> Result<Option<String>>;
    fn clear(&self) -> Result<()>;
}

/// Token store backed by the OS keychain, surviving restarts.
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    fn entry() -> Result<Entry> {
        Entry::new(SERVICE_NAME, TOKEN_KEY).context("Failed to create keyring entry")
    }
}

impl TokenStore for KeyringTokenStore {
    fn save(&self, token: &str) -> Result<()> {
        Self::entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn read(&self) -> Result<Option<String>> {
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// In-memory token store shared by the test suites.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    token: std::sync::Arc<std::sync::Mutex<Option<String>>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        *store.token.lock().unwrap() = Some(token.to_string());
        store
    }

    pub fn stored(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn read(&self) -> Result<Option<String>> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::default();
        assert_eq!(store.read().unwrap(), None);

        store.save("tok1").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("tok1"));

        // Saving again overwrites, it never stacks
        store.save("tok2").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("tok2"));

        store.clear().unwrap();
        assert_eq!(store.read().unwrap(), None);

        // Clearing an empty store is a no-op, not an error
        store.clear().unwrap();
    }
}
