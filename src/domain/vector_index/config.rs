//! Vector index configuration

use serde::{Deserialize, Serialize};

use super::DistanceMetric;
use crate::domain::DomainError;

/// Configuration for an LSH vector index
///
/// Recall and cost are traded through `num_tables`, `hash_bits`, `probes` and
/// `max_candidates`. Query cost is bounded by
/// `num_tables * (1 + probes)` bucket reads plus `max_candidates` distance
/// computations, regardless of how many vectors are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Vector dimension shared by every entry
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Distance metric, fixed for the index lifetime
    #[serde(default)]
    pub metric: DistanceMetric,

    /// Number of independent hash tables
    #[serde(default = "default_num_tables")]
    pub num_tables: usize,

    /// Hash functions per table (signature width, at most 64)
    #[serde(default = "default_hash_bits")]
    pub hash_bits: usize,

    /// Extra neighbouring buckets probed per table at query time
    #[serde(default = "default_probes")]
    pub probes: usize,

    /// Maximum candidates ranked per search
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Quantization width for Euclidean projections
    #[serde(default = "default_bucket_width")]
    pub bucket_width: f32,

    /// Seed for the random projections
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_dimension() -> usize {
    256
}

fn default_num_tables() -> usize {
    8
}

fn default_hash_bits() -> usize {
    12
}

fn default_probes() -> usize {
    2
}

fn default_max_candidates() -> usize {
    256
}

fn default_bucket_width() -> f32 {
    4.0
}

fn default_seed() -> u64 {
    42
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            metric: DistanceMetric::default(),
            num_tables: default_num_tables(),
            hash_bits: default_hash_bits(),
            probes: default_probes(),
            max_candidates: default_max_candidates(),
            bucket_width: default_bucket_width(),
            seed: default_seed(),
        }
    }
}

impl IndexConfig {
    /// Create a config for the given dimension with default tuning
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_num_tables(mut self, num_tables: usize) -> Self {
        self.num_tables = num_tables;
        self
    }

    pub fn with_hash_bits(mut self, hash_bits: usize) -> Self {
        self.hash_bits = hash_bits;
        self
    }

    pub fn with_probes(mut self, probes: usize) -> Self {
        self.probes = probes;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_bucket_width(mut self, width: f32) -> Self {
        self.bucket_width = width;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the configuration before building an index
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.dimension == 0 {
            return Err(DomainError::configuration("index dimension must be > 0"));
        }

        if self.num_tables == 0 {
            return Err(DomainError::configuration("num_tables must be > 0"));
        }

        if self.hash_bits == 0 || self.hash_bits > 64 {
            return Err(DomainError::configuration(format!(
                "hash_bits must be in 1..=64, got {}",
                self.hash_bits
            )));
        }

        if self.probes > self.hash_bits {
            return Err(DomainError::configuration(format!(
                "probes ({}) cannot exceed hash_bits ({})",
                self.probes, self.hash_bits
            )));
        }

        if self.max_candidates == 0 {
            return Err(DomainError::configuration("max_candidates must be > 0"));
        }

        if !(self.bucket_width > 0.0) {
            return Err(DomainError::configuration("bucket_width must be > 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IndexConfig::default();

        assert_eq!(config.dimension, 256);
        assert_eq!(config.metric, DistanceMetric::Cosine);
        assert_eq!(config.num_tables, 8);
        assert_eq!(config.hash_bits, 12);
        assert_eq!(config.probes, 2);
        assert_eq!(config.max_candidates, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = IndexConfig::new(64)
            .with_metric(DistanceMetric::Euclidean)
            .with_num_tables(4)
            .with_hash_bits(8)
            .with_probes(1)
            .with_max_candidates(32)
            .with_bucket_width(2.0)
            .with_seed(7);

        assert_eq!(config.dimension, 64);
        assert_eq!(config.metric, DistanceMetric::Euclidean);
        assert_eq!(config.num_tables, 4);
        assert_eq!(config.hash_bits, 8);
        assert_eq!(config.probes, 1);
        assert_eq!(config.max_candidates, 32);
        assert_eq!(config.seed, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        assert!(IndexConfig::new(0).validate().is_err());
        assert!(IndexConfig::new(8).with_num_tables(0).validate().is_err());
        assert!(IndexConfig::new(8).with_hash_bits(65).validate().is_err());
        assert!(IndexConfig::new(8).with_hash_bits(2).with_probes(3).validate().is_err());
        assert!(IndexConfig::new(8).with_max_candidates(0).validate().is_err());
        assert!(IndexConfig::new(8).with_bucket_width(0.0).validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: IndexConfig = serde_json::from_str(r#"{"dimension": 32}"#).unwrap();
        assert_eq!(config.dimension, 32);
        assert_eq!(config.num_tables, 8);
    }
}
