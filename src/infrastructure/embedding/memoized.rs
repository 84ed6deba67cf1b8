use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::cache::normalize::normalize;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::vector_index::Vector;
use crate::domain::DomainError;

/// Embedding provider wrapper that memoizes vectors by normalized text
#[derive(Debug)]
pub struct MemoizedEmbeddingProvider<P: EmbeddingProvider> {
    inner: P,
    cache: Cache<String, Arc<Vector>>,
}

impl<P: EmbeddingProvider> MemoizedEmbeddingProvider<P> {
    pub fn new(inner: P, capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build();

        Self { inner, cache }
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn cache_size(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for MemoizedEmbeddingProvider<P> {
    async fn embed(&self, text: &str) -> Result<Vector, DomainError> {
        let key = normalize(text);

        if let Some(cached) = self.cache.get(&key).await {
            tracing::trace!(provider = self.inner.provider_name(), "Embedding cache hit");
            return Ok((*cached).clone());
        }

        let vector = self.inner.embed(&key).await?;
        self.cache.insert(key, Arc::new(vector.clone())).await;

        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
