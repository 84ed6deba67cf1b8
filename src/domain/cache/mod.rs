//! Multi-level response cache domain
//!
//! Queries resolve at increasing granularity: full message, phrase, word and
//! finally embedding similarity.

mod config;
mod level;
pub mod normalize;
mod repository;
mod response;

pub use config::CacheConfig;
pub use level::CacheLevel;
pub use repository::{CacheStats, LevelStats, RecordOutcome, ResponseCache};
pub use response::CachedResponse;

#[cfg(test)]
pub use repository::mock::MockResponseCache;
