//! Multi-level cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for the multi-level response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Shortest phrase (in words) stored at the phrase level
    #[serde(default = "default_phrase_min_words")]
    pub phrase_min_words: usize,

    /// Longest phrase (in words) stored at the phrase level
    #[serde(default = "default_phrase_max_words")]
    pub phrase_max_words: usize,

    /// Minimum characters for a phrase to be cached
    #[serde(default = "default_min_phrase_chars")]
    pub min_phrase_chars: usize,

    /// Minimum characters for a word to be cached
    #[serde(default = "default_min_word_chars")]
    pub min_word_chars: usize,

    /// Confidence required before phrase and word levels are written
    #[serde(default = "default_publish_threshold")]
    pub publish_threshold: f64,

    /// Largest distance accepted as a semantic hit
    #[serde(default = "default_semantic_max_distance")]
    pub semantic_max_distance: f32,

    /// Neighbours requested from the index per semantic lookup
    #[serde(default = "default_semantic_top_k")]
    pub semantic_top_k: usize,

    /// Bound on a single embedding call
    #[serde(default = "default_embedding_timeout_ms")]
    pub embedding_timeout_ms: u64,

    /// Maximum entries per level
    #[serde(default = "default_level_capacity")]
    pub level_capacity: usize,

    /// Fraction of a full level evicted at once
    #[serde(default = "default_eviction_batch")]
    pub eviction_batch: f64,

    /// Optional time-to-live for entries in seconds
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

fn default_phrase_min_words() -> usize {
    3
}

fn default_phrase_max_words() -> usize {
    5
}

fn default_min_phrase_chars() -> usize {
    8
}

fn default_min_word_chars() -> usize {
    3
}

fn default_publish_threshold() -> f64 {
    0.7
}

fn default_semantic_max_distance() -> f32 {
    0.15
}

fn default_semantic_top_k() -> usize {
    3
}

fn default_embedding_timeout_ms() -> u64 {
    2000
}

fn default_level_capacity() -> usize {
    10000
}

fn default_eviction_batch() -> f64 {
    0.1
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            phrase_min_words: default_phrase_min_words(),
            phrase_max_words: default_phrase_max_words(),
            min_phrase_chars: default_min_phrase_chars(),
            min_word_chars: default_min_word_chars(),
            publish_threshold: default_publish_threshold(),
            semantic_max_distance: default_semantic_max_distance(),
            semantic_top_k: default_semantic_top_k(),
            embedding_timeout_ms: default_embedding_timeout_ms(),
            level_capacity: default_level_capacity(),
            eviction_batch: default_eviction_batch(),
            ttl_secs: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_millis(self.embedding_timeout_ms)
    }

    pub fn ttl(&self) -> Option<chrono::Duration> {
        self.ttl_secs
            .and_then(|secs| chrono::Duration::try_seconds(secs as i64))
    }

    /// Entries dropped per eviction pass, at least one
    pub fn eviction_count(&self) -> usize {
        ((self.level_capacity as f64 * self.eviction_batch).ceil() as usize).max(1)
    }

    pub fn with_phrase_words(mut self, min: usize, max: usize) -> Self {
        self.phrase_min_words = min;
        self.phrase_max_words = max;
        self
    }

    pub fn with_publish_threshold(mut self, threshold: f64) -> Self {
        self.publish_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_semantic_max_distance(mut self, distance: f32) -> Self {
        self.semantic_max_distance = distance;
        self
    }

    pub fn with_embedding_timeout(mut self, timeout: Duration) -> Self {
        self.embedding_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_level_capacity(mut self, capacity: usize) -> Self {
        self.level_capacity = capacity;
        self
    }

    pub fn with_eviction_batch(mut self, fraction: f64) -> Self {
        self.eviction_batch = fraction;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = Some(ttl.as_secs());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.phrase_min_words == 0 || self.phrase_min_words > self.phrase_max_words {
            return Err(DomainError::configuration(format!(
                "Invalid phrase window {}..={}",
                self.phrase_min_words, self.phrase_max_words
            )));
        }

        if !(0.0..=1.0).contains(&self.publish_threshold) {
            return Err(DomainError::configuration(
                "publish_threshold must be within 0.0..=1.0",
            ));
        }

        if self.semantic_max_distance.is_nan() || self.semantic_max_distance < 0.0 {
            return Err(DomainError::configuration(
                "semantic_max_distance must be non-negative",
            ));
        }

        if self.semantic_top_k == 0 {
            return Err(DomainError::configuration("semantic_top_k must be at least 1"));
        }

        if self.level_capacity == 0 {
            return Err(DomainError::configuration("level_capacity must be at least 1"));
        }

        if !(self.eviction_batch > 0.0 && self.eviction_batch <= 1.0) {
            return Err(DomainError::configuration(
                "eviction_batch must be within (0.0, 1.0]",
            ));
        }

        Ok(())
    }
}
