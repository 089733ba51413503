use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;

/// Keychain service name the token entry lives under
pub const SERVICE_NAME: &str = "tradementor";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Secure storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable, restart-surviving key-value storage for secrets.
///
/// The session layer only ever uses one key, but the store itself doesn't
/// care. Implementations must be encrypted at rest; the in-memory one is
/// for tests and throwaway sessions.
pub trait SecureStore: Send + Sync {
    /// Value stored under `key`, or `None` if there is no entry
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the entry. Deleting a missing entry is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// OS keychain backend (macOS Keychain, Windows Credential Manager,
/// Linux kernel keyutils).
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StoreError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureStore for KeyringStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl SecureStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load("userToken").unwrap().is_none());

        store.save("userToken", "abc").unwrap();
        assert_eq!(store.load("userToken").unwrap().as_deref(), Some("abc"));

        store.save("userToken", "def").unwrap();
        assert_eq!(store.load("userToken").unwrap().as_deref(), Some("def"));
    }

    #[test]
    fn test_memory_store_delete_missing_is_ok() {
        let store = MemoryStore::new();
        store.delete("userToken").unwrap();

        store.save("userToken", "abc").unwrap();
        store.delete("userToken").unwrap();
        assert!(store.load("userToken").unwrap().is_none());
    }

    #[test]
    fn test_keyring_store_service_name() {
        let store = KeyringStore::new();
        assert_eq!(store.service, SERVICE_NAME);
        let custom = KeyringStore::with_service("tradementor-dev");
        assert_eq!(custom.service, "tradementor-dev");
    }
}
