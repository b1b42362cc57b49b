//! Host key-value flag store
//!
//! The page keeps a couple of boolean-ish flags (secret unlocked,
//! construction alert dismissed) in host storage. The simulations never
//! touch it; the app layer goes through this contract so tests and the
//! native binary get an in-memory stand-in.

use std::cell::RefCell;
use std::collections::HashMap;

/// Flag key: the secret code has been entered at least once
pub const SECRET_UNLOCKED_KEY: &str = "neon_graph_secret_unlocked";
/// Flag key: the construction alert was dismissed
pub const ALERT_DISMISSED_KEY: &str = "neon_graph_alert_dismissed";

/// The collaborator contract: get/set string values by key
pub trait FlagStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store for native runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

/// LocalStorage-backed store; every failure degrades to "flag absent"
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl FlagStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        web_sys::window()?
            .local_storage()
            .ok()
            .flatten()?
            .get_item(key)
            .ok()
            .flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok()).flatten() {
            let _ = storage.set_item(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(SECRET_UNLOCKED_KEY), None);
        store.set(SECRET_UNLOCKED_KEY, "1");
        assert_eq!(store.get(SECRET_UNLOCKED_KEY).as_deref(), Some("1"));
        store.set(SECRET_UNLOCKED_KEY, "0");
        assert_eq!(store.get(SECRET_UNLOCKED_KEY).as_deref(), Some("0"));
    }
}
