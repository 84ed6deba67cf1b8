//! LSH vector index with bounded query cost

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use metrics::histogram;
use tracing::trace;

use super::hash_family::HashFamily;
use crate::domain::vector_index::{
    DistanceMetric, EntryId, IndexConfig, IndexEntry, IndexStats, SearchHit, Vector, VectorIndex,
};
use crate::domain::DomainError;

/// Bucket of entry ids in insertion order
type Bucket = Vec<EntryId>;

/// Approximate nearest-neighbour index using locality-sensitive hashing
///
/// Every entry lives in exactly one bucket per hash table. A search reads the
/// query's bucket plus `probes` neighbouring buckets in each table, collects
/// at most `max_candidates` ids (most recent first) and ranks only those by
/// exact distance. Query cost therefore depends on the configuration, not on
/// the number of stored vectors; the price is that true nearest neighbours
/// outside the probed buckets, or beyond the candidate budget, are missed.
/// Because dense buckets are read newest first, an older exact duplicate can
/// fall outside `max_candidates` when many newer entries share its bucket;
/// raise the budget if such buckets are expected.
///
/// Buckets and entries live in sharded concurrent maps, so readers never
/// block each other and writers only lock the shards they touch.
pub struct LshVectorIndex<P> {
    config: IndexConfig,
    family: HashFamily,
    tables: Vec<DashMap<u64, Bucket>>,
    entries: DashMap<EntryId, IndexEntry<P>>,
    next_id: AtomicU64,
    inserted_total: AtomicU64,
    searches: AtomicU64,
    candidates_total: AtomicU64,
}

impl<P> LshVectorIndex<P> {
    /// Create a new index, validating the configuration
    pub fn new(config: IndexConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let family = HashFamily::new(&config);
        let tables = (0..config.num_tables).map(|_| DashMap::new()).collect();

        Ok(Self {
            config,
            family,
            tables,
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
            inserted_total: AtomicU64::new(0),
            searches: AtomicU64::new(0),
            candidates_total: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Total entries ever inserted, including removed ones
    pub fn inserted_total(&self) -> u64 {
        self.inserted_total.load(Ordering::Relaxed)
    }

    /// Ids of every stored entry, oldest first
    pub fn ids(&self) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = self.entries.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), DomainError> {
        if vector.len() != self.config.dimension {
            return Err(DomainError::dimension_mismatch(
                self.config.dimension,
                vector.len(),
            ));
        }

        Ok(())
    }

    /// Gather candidate ids from probed buckets, best probes first
    fn collect_candidates(&self, query: &[f32]) -> Vec<EntryId> {
        let probe_keys: Vec<Vec<u64>> = (0..self.family.num_tables())
            .map(|table| self.family.probe_sequence(table, query))
            .collect();

        let budget = self.config.max_candidates;
        let mut seen = HashSet::with_capacity(budget);
        let mut candidates = Vec::with_capacity(budget);

        'probe: for rank in 0..=self.config.probes {
            for (table, keys) in probe_keys.iter().enumerate() {
                let Some(key) = keys.get(rank) else {
                    continue;
                };

                let Some(bucket) = self.tables[table].get(key) else {
                    continue;
                };

                for id in bucket.iter().rev() {
                    if seen.insert(*id) {
                        candidates.push(*id);

                        if candidates.len() >= budget {
                            break 'probe;
                        }
                    }
                }
            }
        }

        candidates
    }
}

impl<P> VectorIndex<P> for LshVectorIndex<P>
where
    P: Clone + Send + Sync + Debug,
{
    fn add(&self, vector: Vector, payload: P) -> Result<EntryId, DomainError> {
        self.check_dimension(&vector)?;

        let id = EntryId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let signatures: Vec<u64> = (0..self.family.num_tables())
            .map(|table| self.family.signature(table, &vector))
            .collect();

        // Entry first so a concurrent search never sees a dangling bucket id
        self.entries.insert(id, IndexEntry::new(id, vector, payload));

        for (table, signature) in signatures.into_iter().enumerate() {
            self.tables[table].entry(signature).or_default().push(id);
        }

        self.inserted_total.fetch_add(1, Ordering::Relaxed);
        trace!(id = %id, "Indexed vector");

        Ok(id)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit<P>>, DomainError> {
        self.check_dimension(query)?;

        if k == 0 {
            return Err(DomainError::validation("k must be at least 1"));
        }

        let start = Instant::now();
        let candidates = self.collect_candidates(query);
        let metric = self.config.metric;

        let mut hits: Vec<SearchHit<P>> = candidates
            .iter()
            .filter_map(|id| {
                self.entries.get(id).map(|entry| {
                    let distance = metric.distance(query, entry.vector());
                    SearchHit::new(*id, entry.payload().clone(), distance)
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(b.id.cmp(&a.id)));
        hits.truncate(k);

        self.searches.fetch_add(1, Ordering::Relaxed);
        self.candidates_total
            .fetch_add(candidates.len() as u64, Ordering::Relaxed);
        histogram!("vector_index_search_candidates").record(candidates.len() as f64);
        histogram!("vector_index_search_duration_seconds").record(start.elapsed().as_secs_f64());

        Ok(hits)
    }

    fn remove(&self, id: EntryId) -> bool {
        let Some((_, entry)) = self.entries.remove(&id) else {
            return false;
        };

        for table in 0..self.family.num_tables() {
            let signature = self.family.signature(table, entry.vector());

            if let Some(mut bucket) = self.tables[table].get_mut(&signature) {
                bucket.retain(|existing| *existing != id);
            }

            self.tables[table].remove_if(&signature, |_, bucket| bucket.is_empty());
        }

        trace!(id = %id, "Removed vector");
        true
    }

    fn get(&self, id: EntryId) -> Option<P> {
        self.entries.get(&id).map(|entry| entry.payload().clone())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn metric(&self) -> DistanceMetric {
        self.config.metric
    }

    fn stats(&self) -> IndexStats {
        let searches = self.searches.load(Ordering::Relaxed);
        let candidates = self.candidates_total.load(Ordering::Relaxed);

        IndexStats {
            entries: self.entries.len(),
            buckets: self.tables.iter().map(|t| t.len()).sum(),
            searches,
            avg_candidates: if searches == 0 {
                0.0
            } else {
                candidates as f64 / searches as f64
            },
        }
    }

    fn clear(&self) {
        self.entries.clear();
        self.tables.iter().for_each(|t| t.clear());
    }
}

impl<P> Debug for LshVectorIndex<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LshVectorIndex")
            .field("config", &self.config)
            .field("entries", &self.entries.len())
            .finish()
    }
}
