//! Vector index domain models and traits
//!
//! Approximate nearest-neighbour search over embeddings with query cost
//! bounded independently of the number of stored vectors.

mod config;
mod entry;
mod metric;
mod repository;

pub use config::IndexConfig;
pub use entry::{EntryId, IndexEntry, SearchHit, Vector};
pub use metric::{cosine_similarity, dot, euclidean_distance, normalize, DistanceMetric};
pub use repository::{IndexStats, VectorIndex};
