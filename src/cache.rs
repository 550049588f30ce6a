//! Memoized world transforms.

use crate::matrix::Matrix4;
use crate::time::TimeCode;
use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;

/// Hit/miss counters of a [`TransformCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
}

/// Resolved world transforms keyed by node identity and time.
///
/// Each entry is the fully composed, ancestor-inclusive world transform of a
/// node. Entries are only meaningful for the scene they were computed from:
/// create a cache per batch or session and drop (or [`clear`](Self::clear))
/// it when the scene changes.
///
/// The cache is owned by the caller and passed by mutable reference into
/// resolution calls. It is not `Sync`; use one cache per thread.
///
/// # Example
///
/// ```
/// use worldxform::{TransformCache, Matrix4, TimeCode, DVec3};
///
/// let mut cache = TransformCache::new();
/// let m = Matrix4::from_translation(DVec3::X);
///
/// cache.put("/World", TimeCode::Default, m);
/// assert_eq!(cache.get("/World", TimeCode::Default), Some(m));
/// assert_eq!(cache.get("/World", TimeCode::at(1.0)), None);
/// ```
#[derive(Debug)]
pub struct TransformCache<K> {
    entries: HashMap<(K, TimeCode), Matrix4>,
    stats: Cell<CacheStats>,
}

impl<K> Default for TransformCache<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: Cell::new(CacheStats::default()),
        }
    }
}

impl<K: Copy + Eq + Hash> TransformCache<K> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached world transform of `node` at `time`.
    pub fn get(&self, node: K, time: TimeCode) -> Option<Matrix4> {
        let found = self.entries.get(&(node, time)).copied();
        let mut stats = self.stats.get();
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        self.stats.set(stats);
        found
    }

    /// Stores the world transform of `node` at `time`, replacing any
    /// previous entry.
    pub fn put(&mut self, node: K, time: TimeCode, world: Matrix4) {
        self.entries.insert((node, time), world);
    }

    /// Returns true if an entry exists, without touching the counters.
    pub fn contains(&self, node: K, time: TimeCode) -> bool {
        self.entries.contains_key(&(node, time))
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set(CacheStats::default());
    }

    /// Drops the entries computed for `time`.
    pub fn clear_time(&mut self, time: TimeCode) {
        self.entries.retain(|(_, t), _| *t != time);
    }

    /// Returns the hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn put_overwrites() {
        let mut cache = TransformCache::new();
        cache.put(1u32, TimeCode::Default, Matrix4::IDENTITY);
        let moved = Matrix4::from_translation(DVec3::Y);
        cache.put(1u32, TimeCode::Default, moved);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(1, TimeCode::Default), Some(moved));
    }

    #[test]
    fn keyed_by_time() {
        let mut cache = TransformCache::new();
        cache.put(7u32, TimeCode::at(0.0), Matrix4::IDENTITY);
        cache.put(7u32, TimeCode::at(1.0), Matrix4::IDENTITY);
        cache.put(8u32, TimeCode::at(1.0), Matrix4::IDENTITY);

        cache.clear_time(TimeCode::at(1.0));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(7, TimeCode::at(0.0)));
    }

    #[test]
    fn counts_hits_and_misses() {
        let mut cache = TransformCache::new();
        cache.put(1u32, TimeCode::Default, Matrix4::IDENTITY);

        cache.get(1, TimeCode::Default);
        cache.get(2, TimeCode::Default);
        cache.get(1, TimeCode::Default);
        assert_eq!(cache.stats(), CacheStats { hits: 2, misses: 1 });

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
