//! Vector index trait

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::{DistanceMetric, EntryId, SearchHit, Vector};
use crate::domain::DomainError;

/// Statistics for a vector index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Entries currently stored
    pub entries: usize,
    /// Non-empty buckets across all tables
    pub buckets: usize,
    /// Total searches served
    pub searches: u64,
    /// Mean candidates ranked per search
    pub avg_candidates: f64,
}

/// Approximate nearest-neighbour index
///
/// Implementations trade recall for bounded query cost; results are not
/// guaranteed to be the exact nearest neighbours.
pub trait VectorIndex<P>: Send + Sync + Debug {
    /// Insert a vector with its payload, returning the assigned id
    fn add(&self, vector: Vector, payload: P) -> Result<EntryId, DomainError>;

    /// Return up to `k` approximate nearest neighbours, closest first
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit<P>>, DomainError>;

    /// Remove an entry; unknown ids are a no-op returning `false`
    fn remove(&self, id: EntryId) -> bool;

    /// Payload of a stored entry
    fn get(&self, id: EntryId) -> Option<P>;

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension every vector must have
    fn dimension(&self) -> usize;

    /// Metric used for signatures and ranking
    fn metric(&self) -> DistanceMetric;

    fn stats(&self) -> IndexStats;

    /// Remove every entry
    fn clear(&self);
}
