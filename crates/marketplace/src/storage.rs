//! Durable key-value store adapter.
//!
//! Wraps the browser-style per-origin durable storage the marketplace
//! persists into: a single JSON blob for the cart and a single string for
//! the selected UI language. Writes are best-effort and never fail the
//! caller; a full or broken store must never block the UI.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fixed keys in the durable store.
pub mod keys {
    /// JSON array of cart line items.
    pub const CART: &str = "marketplace_cart";
    /// Selected UI language code.
    pub const LANGUAGE: &str = "marketplace_language";
}

/// A durable, origin-scoped key-value store.
///
/// Implementations must survive container restarts (page reloads). The
/// cart and language keys are single-writer-at-a-time by convention; cross
/// context visibility travels over the event bus, not through polling.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str);

    /// Delete the value stored under `key`. No-op when absent.
    fn remove(&self, key: &str);
}

/// In-memory store used in tests and as the default process-local backing.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
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
