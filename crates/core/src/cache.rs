//! Derived-value cache
//!
//! Memoizes expensive values computed from normalized parameters. Entries are
//! tagged with the preprocessing generation they were computed under;
//! invalidating the cache bumps the generation, so older entries read as
//! absent without walking the map. [`DerivedCache::clear`] additionally
//! drops the stale entries to release their memory.
//!
//! Values are stored type-erased behind `Rc<dyn Any>`. Cloning the cache
//! shares the stored values, which is sound because cached values are never
//! mutated after insertion.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

#[derive(Clone)]
struct CacheEntry {
    generation: u64,
    value: Rc<dyn Any>,
}

/// Name-keyed store of lazily computed values
#[derive(Clone, Default)]
pub struct DerivedCache {
    generation: u64,
    entries: HashMap<&'static str, CacheEntry>,
}

impl DerivedCache {
    /// Create an empty cache at generation 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of entries valid in the current generation
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.generation == self.generation)
            .count()
    }

    /// Whether no entry is valid in the current generation
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` holds a value of the current generation
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map_or(false, |e| e.generation == self.generation)
    }

    /// Fetch a current-generation value of type `T`
    ///
    /// Returns `None` for missing keys, stale entries, and entries stored
    /// under a different type.
    pub fn get<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        let entry = self.entries.get(key)?;
        if entry.generation != self.generation {
            return None;
        }
        Rc::clone(&entry.value).downcast::<T>().ok()
    }

    /// Store a value under `key` for the current generation
    pub fn insert<T: 'static>(&mut self, key: &'static str, value: T) -> Rc<T> {
        let value = Rc::new(value);
        self.entries.insert(
            key,
            CacheEntry {
                generation: self.generation,
                value: value.clone() as Rc<dyn Any>,
            },
        );
        value
    }

    /// Return the cached value, computing and storing it on a miss
    pub fn get_or_insert_with<T: 'static>(&mut self, key: &'static str, compute: impl FnOnce() -> T) -> Rc<T> {
        if let Some(hit) = self.get::<T>(key) {
            trace!(target: "genericbuilder::cache", key, generation = self.generation, "cache hit");
            return hit;
        }
        trace!(target: "genericbuilder::cache", key, generation = self.generation, "cache miss");
        self.insert(key, compute())
    }

    /// Make every existing entry stale
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Drop entries from older generations
    pub fn prune(&mut self) {
        let generation = self.generation;
        self.entries.retain(|_, e| e.generation == generation);
    }

    /// Invalidate and release all entries
    pub fn clear(&mut self) {
        self.invalidate();
        self.entries.clear();
    }
}

impl fmt::Debug for DerivedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut live: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, e)| e.generation == self.generation)
            .map(|(k, _)| *k)
            .collect();
        live.sort_unstable();
        f.debug_struct("DerivedCache")
            .field("generation", &self.generation)
            .field("live", &live)
            .finish()
    }
}
