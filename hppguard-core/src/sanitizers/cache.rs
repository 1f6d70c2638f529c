//! cache.rs - Bounded, insert-only memo tables.
//!
//! Each engine instance owns its caches; nothing is global. A cache stops
//! accepting new entries once it reaches its capacity and never evicts, so a
//! lookup either returns exactly what the uncached computation would produce
//! or misses. Results are identical with or without the cache.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashMap;
use std::sync::RwLock;

use log::debug;

/// Entry cap shared by the segment cache and the whitelist match cache.
pub const MAX_CACHE_ENTRIES: usize = 10_000;

/// A thread-safe string-keyed cache with a fixed entry cap.
#[derive(Debug)]
pub struct BoundedCache<V> {
    entries: RwLock<HashMap<String, V>>,
    capacity: usize,
    name: &'static str,
}

impl<V: Clone> BoundedCache<V> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
            name,
        }
    }

    /// Returns the cached value for `key`, computing and (space permitting)
    /// storing it on a miss.
    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        // A poisoned lock only means another thread panicked mid-insert; the
        // cache is advisory, so fall back to computing.
        if let Ok(entries) = self.entries.read() {
            if let Some(value) = entries.get(key) {
                return value.clone();
            }
        }

        let value = compute();

        if let Ok(mut entries) = self.entries.write() {
            if entries.len() < self.capacity {
                entries.insert(key.to_string(), value.clone());
                if entries.len() == self.capacity {
                    debug!("Cache '{}' reached its cap of {} entries.", self.name, self.capacity);
                }
            }
        }
        value
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
