//! Index entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fixed-dimension embedding vector
pub type Vector = Vec<f32>;

/// Stable identifier assigned at insertion time
///
/// Ids increase monotonically and are never reused, so a larger id always
/// means a more recent insertion. Gaps appear after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored vector with its payload
#[derive(Debug, Clone)]
pub struct IndexEntry<P> {
    id: EntryId,
    vector: Vector,
    payload: P,
    inserted_at: DateTime<Utc>,
}

impl<P> IndexEntry<P> {
    pub fn new(id: EntryId, vector: Vector, payload: P) -> Self {
        Self {
            id,
            vector,
            payload,
            inserted_at: Utc::now(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn inserted_at(&self) -> DateTime<Utc> {
        self.inserted_at
    }
}

/// A single search result
#[derive(Debug, Clone)]
pub struct SearchHit<P> {
    pub id: EntryId,
    pub payload: P,
    /// Distance under the index metric (lower is closer)
    pub distance: f32,
}

impl<P> SearchHit<P> {
    pub fn new(id: EntryId, payload: P, distance: f32) -> Self {
        Self {
            id,
            payload,
            distance,
        }
    }
}
