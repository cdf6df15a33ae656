//! Persistent geocoding result cache.
//!
//! Maps a lower-cased, cleaned address to its coordinates. The whole
//! mapping is serialized as one JSON object under a single entry of the
//! injected [`KeyValueStore`], rewritten after every new entry. Only
//! successful geocodes are cached so failed lookups are retried on the
//! next load.
//!
//! Durability is best-effort: read failures and corrupt JSON start an
//! empty cache, and write failures are logged and otherwise ignored.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use propmap_region_models::Coords;

use crate::KeyValueStore;

/// Store entry name used when none is configured.
pub const DEFAULT_CACHE_KEY: &str = "geocodeCache";

/// Normalizes an address into its cache key.
#[must_use]
pub fn cache_key(address: &str) -> String {
    address.trim().to_lowercase()
}

/// In-memory geocode cache mirrored to a [`KeyValueStore`] entry.
pub struct GeocodeCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    entries: Mutex<BTreeMap<String, Coords>>,
}

impl std::fmt::Debug for GeocodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodeCache")
            .field("key", &self.key)
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl GeocodeCache {
    /// Loads the cache stored under `key`.
    ///
    /// Never fails: a missing entry, unreadable storage, or unparseable
    /// JSON all produce an empty cache.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let entries = match store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<BTreeMap<String, Coords>>(&raw) {
                Ok(entries) => {
                    log::info!("Loaded {} cached geocodes from '{key}'", entries.len());
                    entries
                }
                Err(e) => {
                    log::warn!("Geocode cache '{key}' is corrupt, starting empty: {e}");
                    BTreeMap::new()
                }
            },
            Ok(None) => {
                log::debug!("No geocode cache stored under '{key}'");
                BTreeMap::new()
            }
            Err(e) => {
                log::warn!("Failed to read geocode cache '{key}', starting empty: {e}");
                BTreeMap::new()
            }
        };

        Self {
            store,
            key: key.to_string(),
            entries: Mutex::new(entries),
        }
    }

    /// Loads the cache stored under [`DEFAULT_CACHE_KEY`].
    #[must_use]
    pub fn load_default(store: Arc<dyn KeyValueStore>) -> Self {
        Self::load(store, DEFAULT_CACHE_KEY)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Coords>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks up the cached coordinates for `address`.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<Coords> {
        self.lock().get(&cache_key(address)).copied()
    }

    /// Caches `coords` for `address` and persists the whole cache.
    pub fn put(&self, address: &str, coords: Coords) {
        self.lock().insert(cache_key(address), coords);
        self.persist();
    }

    /// Writes the full mapping back to the store.
    ///
    /// Failures are logged, not returned.
    pub fn persist(&self) {
        let serialized = {
            let entries = self.lock();
            serde_json::to_string(&*entries)
        };

        let result = serialized
            .map_err(crate::StoreError::from)
            .and_then(|json| self.store.set(&self.key, &json));

        if let Err(e) = result {
            log::warn!("Failed to persist geocode cache '{}': {e}", self.key);
        }
    }

    /// Empties the cache and removes its stored entry.
    pub fn clear(&self) {
        let removed = {
            let mut entries = self.lock();
            let n = entries.len();
            entries.clear();
            n
        };

        if let Err(e) = self.store.remove(&self.key) {
            log::warn!("Failed to remove geocode cache '{}': {e}", self.key);
        }
        log::info!("Cleared {removed} cached geocodes");
    }

    /// Number of cached addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current mapping.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Coords> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StoreError};

    fn memory() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey {
                key: key.to_string(),
            })
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    #[test]
    fn put_persist_load_roundtrip() {
        let store = memory();
        let cache = GeocodeCache::load_default(store.clone());
        let coords = Coords::new(-33.8688, 151.2093);
        cache.put("1 George St, Sydney NSW", coords);
        cache.persist();

        let fresh = GeocodeCache::load_default(store);
        assert_eq!(fresh.get("1 george st, sydney nsw"), Some(coords));
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let cache = GeocodeCache::load_default(memory());
        let coords = Coords::new(1.0, 2.0);
        cache.put("Main St", coords);
        assert_eq!(cache.get("MAIN ST"), Some(coords));
        assert_eq!(cache.get("  main st "), Some(coords));
        assert!(cache.snapshot().contains_key("main st"));
    }

    #[test]
    fn put_writes_through_immediately() {
        let store = memory();
        let cache = GeocodeCache::load_default(store.clone());
        cache.put("a", Coords::new(1.0, 2.0));

        let raw = store.get(DEFAULT_CACHE_KEY).unwrap().unwrap();
        let parsed: BTreeMap<String, Coords> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.get("a"), Some(&Coords::new(1.0, 2.0)));
    }

    #[test]
    fn corrupt_entry_loads_empty() {
        let store = memory();
        store.set(DEFAULT_CACHE_KEY, "{not json").unwrap();
        let cache = GeocodeCache::load_default(store);
        assert!(cache.is_empty());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let store = memory();
        store.set(DEFAULT_CACHE_KEY, "[1, 2, 3]").unwrap();
        let cache = GeocodeCache::load_default(store);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_removes_stored_entry() {
        let store = memory();
        let cache = GeocodeCache::load_default(store.clone());
        cache.put("a", Coords::new(1.0, 2.0));
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(store.get(DEFAULT_CACHE_KEY).unwrap(), None);
        assert!(GeocodeCache::load_default(store).is_empty());
    }

    #[test]
    fn write_failures_do_not_propagate() {
        let cache = GeocodeCache::load_default(Arc::new(ReadOnlyStore));
        cache.put("a", Coords::new(1.0, 2.0));
        assert_eq!(cache.get("a"), Some(Coords::new(1.0, 2.0)));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn separate_keys_are_independent() {
        let store = memory();
        let a = GeocodeCache::load(store.clone(), "cacheA");
        a.put("x", Coords::new(1.0, 1.0));
        let b = GeocodeCache::load(store, "cacheB");
        assert!(b.is_empty());
    }
}
