//! Session-scoped key/value storage.
//!
//! Stand-in for the browser's session storage: a handful of string keys only
//! this session's code touches. The guest cart and the bearer token live
//! here; both the [`crate::api::ApiClient`] and the
//! [`crate::session::SessionProvider`] share one handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Keys used in session storage.
pub mod keys {
    /// Key for the bearer token of an authenticated session.
    pub const TOKEN: &str = "token";

    /// Key for the JSON-encoded guest cart.
    pub const GUEST_CART: &str = "cart_guest";
}

/// A session-scoped string key/value store.
///
/// Deliberately infallible, like the browser API it mirrors: a missing key is
/// `None`, never an error, and callers treat undecodable values as absent.
pub trait KeyValueStorage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str);

    /// Delete a value if present.
    fn remove(&self, key: &str);
}

/// Shared storage handle.
pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// In-memory [`KeyValueStorage`], scoped to the session that owns it.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .map(|entries| entries.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("token"), None);

        storage.set("token", "abc");
        assert_eq!(storage.get("token"), Some("abc".to_owned()));

        storage.set("token", "def");
        assert_eq!(storage.get("token"), Some("def".to_owned()));

        storage.remove("token");
        assert_eq!(storage.get("token"), None);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let storage = MemoryStorage::new();
        storage.remove("nope");
        assert_eq!(storage.get("nope"), None);
    }
}
