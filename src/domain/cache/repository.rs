//! Response cache trait and types

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CacheLevel, CachedResponse};
use crate::domain::vector_index::IndexStats;
use crate::domain::DomainError;

/// What a single record call wrote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub full_message: bool,
    /// Phrase keys written
    pub phrases: usize,
    /// Word keys written
    pub words: usize,
    pub semantic: bool,
    /// Entries evicted to make room
    pub evicted: usize,
    /// Problems that prevented some writes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl RecordOutcome {
    pub fn wrote_anything(&self) -> bool {
        self.full_message || self.semantic || self.phrases > 0 || self.words > 0
    }

    /// Levels that received at least one entry
    pub fn levels(&self) -> Vec<CacheLevel> {
        let mut levels = Vec::new();

        if self.full_message {
            levels.push(CacheLevel::FullMessage);
        }
        if self.phrases > 0 {
            levels.push(CacheLevel::Phrase);
        }
        if self.words > 0 {
            levels.push(CacheLevel::Word);
        }
        if self.semantic {
            levels.push(CacheLevel::Semantic);
        }

        levels
    }
}

/// Counters for one cache level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl LevelStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;

        if total == 0 {
            return 0.0;
        }

        self.hits as f64 / total as f64
    }
}

/// Statistics for the multi-level cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub full_message: LevelStats,
    pub phrase: LevelStats,
    pub word: LevelStats,
    pub semantic: LevelStats,
    /// Total lookups served
    pub lookups: u64,
    /// Lookups that missed every level
    pub misses: u64,
    /// Embedding timeouts or errors
    pub embedding_failures: u64,
    pub records: u64,
    pub index: IndexStats,
}

impl CacheStats {
    pub fn level(&self, level: CacheLevel) -> &LevelStats {
        match level {
            CacheLevel::FullMessage => &self.full_message,
            CacheLevel::Phrase => &self.phrase,
            CacheLevel::Word => &self.word,
            CacheLevel::Semantic => &self.semantic,
        }
    }

    /// Share of lookups answered by any level
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            return 0.0;
        }

        (self.lookups - self.misses) as f64 / self.lookups as f64
    }
}

/// Cache answering queries at increasing granularity
#[async_trait]
pub trait ResponseCache: Send + Sync + Debug {
    /// Resolve a query; `None` when no level matches
    async fn lookup(&self, query: &str) -> Result<Option<CachedResponse>, DomainError>;

    /// Store a (query, response) pair at every level it qualifies for
    async fn record(&self, query: &str, response: &str, confidence: f64) -> RecordOutcome {
        self.record_at(query, response, confidence, Utc::now()).await
    }

    /// Like `record`, keeping an original creation time
    async fn record_at(
        &self,
        query: &str,
        response: &str,
        confidence: f64,
        created_at: DateTime<Utc>,
    ) -> RecordOutcome;

    /// Recorded (query, response) pairs in insertion order
    fn entries(&self) -> Vec<(String, CachedResponse)>;

    fn stats(&self) -> CacheStats;

    fn clear(&self);
}
