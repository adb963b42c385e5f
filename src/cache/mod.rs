use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use itertools::Itertools;
use log::warn;

use crate::manifest::Category;

pub mod entry;

pub use entry::CacheEntry;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub category: Category,
    pub name: String,
}

impl CacheKey {
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }
}

/// The central keyed store: `(category, name) -> entry`. Within one category
/// a name is unique; inserting under an existing key keeps the existing entry
/// (the loaders guarantee a second load is a no-op that observes the first).
///
/// Mutation happens from blocking loader threads and the eviction sweep, so
/// the map must serialize read-modify-write itself; removal never disposes —
/// disposal stays with the caller so tests can verify it ran exactly once.
#[derive(Default)]
pub struct AssetCache {
    entries: DashMap<CacheKey, Arc<CacheEntry>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_capacity(100),
        }
    }

    pub fn get(&self, category: Category, name: &str) -> Option<Arc<CacheEntry>> {
        self.entries
            .get(&CacheKey::new(category, name))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn has_name(&self, category: Category, name: &str) -> bool {
        self.entries.contains_key(&CacheKey::new(category, name))
    }

    /// First insert wins; returns the entry that is now in the cache. A lost
    /// race is logged because it means the in-flight dedup let two loads of
    /// the same key through.
    pub fn put(&self, category: Category, name: &str, entry: Arc<CacheEntry>) -> Arc<CacheEntry> {
        match self.entries.entry(CacheKey::new(category, name)) {
            Entry::Occupied(existing) => {
                warn!("{}/{} was already cached; keeping the existing entry", category, name);
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                slot.insert(entry.clone());
                entry
            }
        }
    }

    /// Removes and returns without disposing.
    pub fn remove(&self, category: Category, name: &str) -> Option<Arc<CacheEntry>> {
        self.entries
            .remove(&CacheKey::new(category, name))
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of every key, for the eviction sweep and for stats.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect_vec()
    }

    pub fn names_in(&self, category: Category) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.key().category == category)
            .map(|entry| entry.key().name.clone())
            .sorted()
            .collect_vec()
    }

    pub fn count_in(&self, category: Category) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key().category == category)
            .count()
    }
}
