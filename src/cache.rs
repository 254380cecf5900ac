//! TTL-keyed response cache.
//!
//! One store instance per scope: the engine owns a session-wide instance
//! that survives screen navigation, and a UI context may own a page-local
//! instance it drops on teardown. Both share the same contract; only the
//! lifetime differs.
//!
//! Values are stored as JSON, the same way cached remote payloads are held
//! elsewhere in the stack; a read past `expires_at` is a miss, and entries
//! are never refreshed implicitly, only overwritten or invalidated.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache key for the favorites list (non-paginated, no offset component).
pub const FAVORITES_KEY: &str = "favorites";

/// Cache key for the map-oriented listing.
pub const MAP_PINS_KEY: &str = "map:pins";

/// Composite key for one search page: full query identity plus offset, so
/// two filters or two pages never collide.
#[must_use]
pub fn search_page_key(identity: &str, offset: u32) -> String {
    format!("search:{identity}:offset={offset}")
}

/// True for every key holding a list-shaped response whose `is_favorite`
/// annotations go stale when a favorite mutation commits.
#[must_use]
pub fn is_list_key(key: &str) -> bool {
    key.starts_with("search:") || key == FAVORITES_KEY || key == MAP_PINS_KEY
}

struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

#[derive(Default)]
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl CacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value, or `None` if the key is absent, expired,
    /// or no longer deserializes to `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries();
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            entries.remove(key);
            return None;
        }
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Dropping cache entry '{key}' with stale shape: {e}");
                entries.remove(key);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(json) => {
                self.entries().insert(
                    key.to_string(),
                    CacheEntry {
                        value: json,
                        expires_at: Instant::now() + ttl,
                    },
                );
            }
            Err(e) => debug!("Refusing to cache '{key}': {e}"),
        }
    }

    /// Removes every entry whose key matches the predicate; returns the
    /// number of entries removed.
    pub fn invalidate<F: Fn(&str) -> bool>(&self, predicate: F) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_what_was_set() {
        let cache = CacheStore::new();
        cache.set("k", &vec![1u32, 2, 3], Duration::from_secs(60));
        assert_eq!(cache.get::<Vec<u32>>("k"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn expired_entry_reads_as_absent() {
        let cache = CacheStore::new();
        cache.set("k", &"value", Duration::ZERO);
        assert_eq!(cache.get::<String>("k"), None);
        assert!(cache.is_empty(), "expired entry should be evicted on read");
    }

    #[test]
    fn overwrite_replaces_value_and_ttl() {
        let cache = CacheStore::new();
        cache.set("k", &1u32, Duration::ZERO);
        cache.set("k", &2u32, Duration::from_secs(60));
        assert_eq!(cache.get::<u32>("k"), Some(2));
    }

    #[test]
    fn invalidate_by_predicate() {
        let cache = CacheStore::new();
        cache.set(&search_page_key("q", 0), &1u32, Duration::from_secs(60));
        cache.set(&search_page_key("q", 20), &2u32, Duration::from_secs(60));
        cache.set(FAVORITES_KEY, &3u32, Duration::from_secs(60));
        cache.set("unrelated", &4u32, Duration::from_secs(60));

        let removed = cache.invalidate(is_list_key);
        assert_eq!(removed, 3);
        assert_eq!(cache.get::<u32>("unrelated"), Some(4));
    }

    #[test]
    fn page_keys_never_collide_across_filters_or_offsets() {
        assert_ne!(search_page_key("a", 0), search_page_key("b", 0));
        assert_ne!(search_page_key("a", 0), search_page_key("a", 20));
    }

    #[test]
    fn map_pins_is_a_list_key() {
        assert!(is_list_key(MAP_PINS_KEY));
        assert!(!is_list_key("drafts"));
    }
}
