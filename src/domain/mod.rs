//! Domain layer - Core business logic and entities

pub mod cache;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod vector_index;

pub use cache::{CacheConfig, CacheLevel, CacheStats, CachedResponse, RecordOutcome, ResponseCache};
pub use embedding::EmbeddingProvider;
pub use error::DomainError;
pub use generation::{FallbackGenerator, Generation};
pub use vector_index::{DistanceMetric, IndexConfig, SearchHit, Vector, VectorIndex};
