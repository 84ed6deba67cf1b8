//! Cached response entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::CacheLevel;

/// A response stored at one cache level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    text: String,
    confidence: f64,
    level: CacheLevel,
    /// Insertion sequence number; larger is more recent
    seq: u64,
    created_at: DateTime<Utc>,
    last_used: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(text: impl Into<String>, confidence: f64, level: CacheLevel, seq: u64) -> Self {
        let now = Utc::now();

        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            level,
            seq,
            created_at: now,
            last_used: now,
        }
    }

    /// Keep the original creation time (used when restoring)
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.last_used = created_at;
        self
    }

    /// Same response stored at another level
    pub fn at_level(&self, level: CacheLevel) -> Self {
        Self {
            level,
            ..self.clone()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn level(&self) -> CacheLevel {
        self.level
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used(&self) -> DateTime<Utc> {
        self.last_used
    }

    /// Mark as used now
    pub fn touch(&mut self) {
        self.last_used = Utc::now();
    }

    pub fn set_last_used(&mut self, at: DateTime<Utc>) {
        self.last_used = at;
    }

    /// Whether the entry outlived `ttl`; no TTL means never
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| Utc::now() - self.created_at >= ttl)
    }
}
