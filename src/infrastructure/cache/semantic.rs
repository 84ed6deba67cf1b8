//! Embedding-similarity level backed by a vector index

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use super::eviction::select_victims;
use super::store::LevelCounters;
use crate::domain::cache::{CacheLevel, CachedResponse, LevelStats};
use crate::domain::vector_index::{EntryId, IndexStats, Vector, VectorIndex};
use crate::domain::DomainError;

/// Mutable bookkeeping for an immutable index entry
#[derive(Debug, Clone)]
struct EntryMeta {
    query: String,
    last_used: DateTime<Utc>,
}

#[derive(Debug)]
pub(crate) struct SemanticStore {
    index: Box<dyn VectorIndex<CachedResponse>>,
    meta: DashMap<EntryId, EntryMeta>,
    by_query: DashMap<String, EntryId>,
    pub counters: LevelCounters,
}

impl SemanticStore {
    pub fn new(index: Box<dyn VectorIndex<CachedResponse>>) -> Self {
        Self {
            index,
            meta: DashMap::new(),
            by_query: DashMap::new(),
            counters: LevelCounters::default(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Index `vector` for `query`, replacing an earlier entry for the same query
    pub fn insert(
        &self,
        query: String,
        vector: Vector,
        response: &CachedResponse,
    ) -> Result<EntryId, DomainError> {
        let id = self
            .index
            .add(vector, response.at_level(CacheLevel::Semantic))?;

        self.meta.insert(
            id,
            EntryMeta {
                query: query.clone(),
                last_used: response.last_used(),
            },
        );

        if let Some(previous) = self.by_query.insert(query, id) {
            self.remove(previous);
        }

        Ok(id)
    }

    pub fn remove(&self, id: EntryId) -> bool {
        if let Some((_, meta)) = self.meta.remove(&id) {
            self.by_query.remove_if(&meta.query, |_, current| *current == id);
        }

        self.index.remove(id)
    }

    /// Closest live entry within `max_distance`
    pub fn nearest(
        &self,
        vector: &[f32],
        k: usize,
        max_distance: f32,
        ttl: Option<Duration>,
    ) -> Result<Option<CachedResponse>, DomainError> {
        for hit in self.index.search(vector, k)? {
            if hit.payload.is_expired(ttl) {
                self.remove(hit.id);
                continue;
            }

            if hit.distance > max_distance {
                break;
            }

            let now = Utc::now();
            if let Some(mut meta) = self.meta.get_mut(&hit.id) {
                meta.last_used = now;
            }

            let mut response = hit.payload;
            response.set_last_used(now);
            return Ok(Some(response));
        }

        Ok(None)
    }

    pub fn enforce_capacity(&self, capacity: usize, batch: usize, ttl: Option<Duration>) -> usize {
        if self.index.len() <= capacity {
            return 0;
        }

        let candidates: Vec<(EntryId, (DateTime<Utc>, EntryId), bool)> = self
            .meta
            .iter()
            .map(|e| {
                let expired = self
                    .index
                    .get(*e.key())
                    .is_none_or(|payload| payload.is_expired(ttl));
                (*e.key(), (e.last_used, *e.key()), expired)
            })
            .collect();

        let victims: HashSet<EntryId> = select_victims(&candidates, capacity, batch)
            .into_iter()
            .collect();

        let evicted = victims.iter().filter(|id| self.remove(**id)).count();

        self.counters.evicted(evicted);
        evicted
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn stats(&self) -> LevelStats {
        self.counters.snapshot(self.index.len())
    }

    pub fn index_stats(&self) -> IndexStats {
        self.index.stats()
    }

    pub fn clear(&self) {
        self.index.clear();
        self.meta.clear();
        self.by_query.clear();
        self.counters.reset();
    }
}
