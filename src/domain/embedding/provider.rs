//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::vector_index::Vector;
use crate::domain::DomainError;

/// Maps text to a fixed-dimension vector
///
/// Implementations must be deterministic for identical input and always
/// return vectors of `dimensions()` length.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    async fn embed(&self, text: &str) -> Result<Vector, DomainError>;

    /// Length of every returned vector
    fn dimensions(&self) -> usize;

    fn provider_name(&self) -> &'static str;
}
