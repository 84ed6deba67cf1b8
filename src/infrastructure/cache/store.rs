//! Per-level entry stores

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use super::eviction::select_victims;
use crate::domain::cache::{CacheLevel, CachedResponse, LevelStats};

/// Hit, miss and eviction counters for one level
#[derive(Debug, Default)]
pub(crate) struct LevelCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl LevelCounters {
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn evicted(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self, entries: usize) -> LevelStats {
        LevelStats {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

/// Normalized-text keyed store for the exact, phrase and word levels
#[derive(Debug)]
pub(crate) struct KeyedStore {
    level: CacheLevel,
    entries: DashMap<String, CachedResponse>,
    pub counters: LevelCounters,
}

impl KeyedStore {
    pub fn new(level: CacheLevel) -> Self {
        Self {
            level,
            entries: DashMap::new(),
            counters: LevelCounters::default(),
        }
    }

    pub fn level(&self) -> CacheLevel {
        self.level
    }

    /// Live entry for `key`; expired entries are dropped on sight
    pub fn fresh(&self, key: &str, ttl: Option<Duration>) -> Option<CachedResponse> {
        let entry = self.entries.get(key)?;

        if entry.is_expired(ttl) {
            drop(entry);
            self.entries.remove_if(key, |_, e| e.is_expired(ttl));
            return None;
        }

        Some(entry.value().clone())
    }

    /// Mark `key` used, returning the updated entry
    pub fn touch(&self, key: &str) -> Option<CachedResponse> {
        let mut entry = self.entries.get_mut(key)?;
        entry.touch();
        Some(entry.value().clone())
    }

    pub fn insert(&self, key: String, response: CachedResponse) {
        self.entries.insert(key, response.at_level(self.level));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries ordered by insertion sequence
    pub fn entries(&self) -> Vec<(String, CachedResponse)> {
        let mut entries: Vec<(String, CachedResponse)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by_key(|(_, response)| response.seq());
        entries
    }

    /// Evict down to `capacity`, returning how many entries were dropped
    pub fn enforce_capacity(&self, capacity: usize, batch: usize, ttl: Option<Duration>) -> usize {
        if self.entries.len() <= capacity {
            return 0;
        }

        let candidates: Vec<(String, (DateTime<Utc>, u64), bool)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), (e.last_used(), e.seq()), e.is_expired(ttl)))
            .collect();

        let evicted = select_victims(&candidates, capacity, batch)
            .into_iter()
            .filter(|key| self.entries.remove(key).is_some())
            .count();

        self.counters.evicted(evicted);
        evicted
    }

    pub fn stats(&self) -> LevelStats {
        self.counters.snapshot(self.entries.len())
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.counters.reset();
    }
}
