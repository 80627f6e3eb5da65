//! Cache Store Module
//!
//! A set of named caches, each a plain key/value map. There is no TTL and
//! no capacity bound: entries leave only through explicit eviction.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use crate::cache::CacheStats;

// == Named Cache ==
#[derive(Debug)]
struct NamedCache<V> {
    entries: HashMap<String, V>,
    /// Bumped by every write to this cache
    version: u64,
}

impl<V> Default for NamedCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            version: 0,
        }
    }
}

// == Cache Store ==
/// Named keyed caches, safe for concurrent readers and writers.
///
/// Every write method takes the store's write lock once, so a multi-key
/// write is observed either completely or not at all.
#[derive(Debug)]
pub struct CacheStore<V> {
    caches: RwLock<HashMap<String, NamedCache<V>>>,
    stats: Mutex<HashMap<String, CacheStats>>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a store with the given caches already registered.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let caches = names
            .into_iter()
            .map(|name| (name.into(), NamedCache::default()))
            .collect();

        Self {
            caches: RwLock::new(caches),
            stats: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true if a cache with this name exists.
    pub fn has_cache(&self, cache_name: &str) -> bool {
        self.caches.read().contains_key(cache_name)
    }

    /// Names of all registered caches, sorted.
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().keys().cloned().collect();
        names.sort();
        names
    }

    // == Put ==
    /// Stores a value under one key, creating the cache if needed.
    pub fn put(&self, cache_name: &str, key: impl Into<String>, value: V) {
        let mut caches = self.caches.write();
        let cache = caches.entry(cache_name.to_string()).or_default();
        cache.version += 1;
        cache.entries.insert(key.into(), value);
    }

    /// Stores the same value under several keys in one atomic step.
    pub fn put_all<I, K>(&self, cache_name: &str, keys: I, value: V)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.replace(cache_name, std::iter::empty::<String>(), |_| false, keys, value);
    }

    /// Atomically removes `stale` keys whose value still satisfies `owned`,
    /// then stores `value` under every key in `keys`.
    pub fn replace<S, SK, I, K, F>(&self, cache_name: &str, stale: S, owned: F, keys: I, value: V)
    where
        S: IntoIterator<Item = SK>,
        SK: AsRef<str>,
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(&V) -> bool,
    {
        let mut caches = self.caches.write();
        let cache = caches.entry(cache_name.to_string()).or_default();
        cache.version += 1;

        for key in stale {
            let key = key.as_ref();
            if cache.entries.get(key).is_some_and(&owned) {
                cache.entries.remove(key);
            }
        }
        for key in keys {
            cache.entries.insert(key.into(), value.clone());
        }
    }

    /// Stores the value under those of `keys` that are vacant, but only if
    /// nothing has written to the cache since `version` was read. Returns
    /// whether the cache was written.
    pub fn fill_if_version<I, K>(&self, cache_name: &str, keys: I, value: V, version: u64) -> bool
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut caches = self.caches.write();
        let cache = caches.entry(cache_name.to_string()).or_default();
        if cache.version != version {
            return false;
        }
        cache.version += 1;
        for key in keys {
            cache.entries.entry(key.into()).or_insert_with(|| value.clone());
        }
        true
    }

    /// Write version of a cache (0 for unknown caches).
    pub fn version(&self, cache_name: &str) -> u64 {
        self.caches
            .read()
            .get(cache_name)
            .map_or(0, |cache| cache.version)
    }

    // == Get ==
    /// Retrieves a value by key, recording a hit or a miss.
    pub fn get(&self, cache_name: &str, key: &str) -> Option<V> {
        let value = self
            .caches
            .read()
            .get(cache_name)
            .and_then(|cache| cache.entries.get(key).cloned());

        let mut stats = self.stats.lock();
        let stats = stats.entry(cache_name.to_string()).or_default();
        if value.is_some() {
            stats.record_hit();
        } else {
            stats.record_miss();
        }
        value
    }

    /// Checks key presence without touching the statistics.
    pub fn contains_key(&self, cache_name: &str, key: &str) -> bool {
        self.caches
            .read()
            .get(cache_name)
            .is_some_and(|cache| cache.entries.contains_key(key))
    }

    /// Number of entries in a cache (0 for unknown caches).
    pub fn size(&self, cache_name: &str) -> usize {
        self.caches
            .read()
            .get(cache_name)
            .map_or(0, |cache| cache.entries.len())
    }

    /// Snapshot of all entries of a cache, sorted by key.
    pub fn entries(&self, cache_name: &str) -> Vec<(String, V)> {
        let mut entries: Vec<(String, V)> = self
            .caches
            .read()
            .get(cache_name)
            .map(|cache| {
                cache
                    .entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    // == Evict All ==
    /// Removes every entry of a cache.
    ///
    /// Returns the number of entries removed.
    pub fn evict_all(&self, cache_name: &str) -> usize {
        let removed = {
            let mut caches = self.caches.write();
            let cache = caches.entry(cache_name.to_string()).or_default();
            cache.version += 1;
            let removed = cache.entries.len();
            cache.entries.clear();
            removed
        };

        self.stats
            .lock()
            .entry(cache_name.to_string())
            .or_default()
            .record_evictions(removed);
        removed
    }

    // == Stats ==
    /// Returns current statistics for a cache.
    pub fn stats(&self, cache_name: &str) -> CacheStats {
        let mut stats = self
            .stats
            .lock()
            .get(cache_name)
            .cloned()
            .unwrap_or_default();
        stats.total_entries = self.size(cache_name);
        stats.hit_rate = stats.hit_rate();
        stats
    }
}
