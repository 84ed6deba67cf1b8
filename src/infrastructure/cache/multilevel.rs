//! Multi-level response cache

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{debug, warn};

use super::semantic::SemanticStore;
use super::store::KeyedStore;
use super::writer::CacheWriter;
use crate::domain::cache::normalize::{content_words, ngrams, normalize, words};
use crate::domain::cache::{
    CacheConfig, CacheLevel, CacheStats, CachedResponse, RecordOutcome, ResponseCache,
};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::vector_index::{IndexConfig, Vector, VectorIndex};
use crate::domain::DomainError;
use crate::infrastructure::vector_index::LshVectorIndex;

/// Response cache resolving queries at increasing granularity
///
/// A lookup probes the full normalized message, then its phrases, then its
/// content words and finally the embedding index. The first level that
/// matches wins, so an exact match always beats a fuzzy one. Keyed levels
/// are sharded concurrent maps; no lock is held across an await point.
#[derive(Debug)]
pub struct MultiLevelCache {
    config: CacheConfig,
    pub(super) full_message: KeyedStore,
    pub(super) phrase: KeyedStore,
    pub(super) word: KeyedStore,
    pub(super) semantic: SemanticStore,
    embedder: Arc<dyn EmbeddingProvider>,
    seq: AtomicU64,
    lookups: AtomicU64,
    misses: AtomicU64,
    embedding_failures: AtomicU64,
    records: AtomicU64,
}

impl MultiLevelCache {
    /// Create a cache whose semantic level is an LSH index
    pub fn new(
        config: CacheConfig,
        index_config: IndexConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        let index = LshVectorIndex::new(index_config)?;
        Self::with_index(config, Box::new(index), embedder)
    }

    /// Create a cache around an existing vector index
    pub fn with_index(
        config: CacheConfig,
        index: Box<dyn VectorIndex<CachedResponse>>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        if embedder.dimensions() != index.dimension() {
            return Err(DomainError::configuration(format!(
                "Embedding provider '{}' produces {} dimensions but the index expects {}",
                embedder.provider_name(),
                embedder.dimensions(),
                index.dimension()
            )));
        }

        Ok(Self {
            config,
            full_message: KeyedStore::new(CacheLevel::FullMessage),
            phrase: KeyedStore::new(CacheLevel::Phrase),
            word: KeyedStore::new(CacheLevel::Word),
            semantic: SemanticStore::new(index),
            embedder,
            seq: AtomicU64::new(1),
            lookups: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            embedding_failures: AtomicU64::new(0),
            records: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Writer populating every level of this cache
    pub fn writer(&self) -> CacheWriter<'_> {
        CacheWriter::new(self)
    }

    /// Resolve a query against every level in order
    pub async fn lookup(&self, query: &str) -> Result<Option<CachedResponse>, DomainError> {
        let normalized = normalize(query);

        if normalized.is_empty() {
            return Err(DomainError::EmptyQuery);
        }

        self.lookups.fetch_add(1, Ordering::Relaxed);

        let tokens = words(&normalized);

        let found = match self.lookup_full_message(&normalized) {
            Some(hit) => Some(hit),
            None => match self.lookup_phrase(&tokens) {
                Some(hit) => Some(hit),
                None => match self.lookup_word(&tokens) {
                    Some(hit) => Some(hit),
                    None => self.lookup_semantic(&normalized).await?,
                },
            },
        };

        match found {
            Some(response) => {
                debug!(level = %response.level(), seq = response.seq(), "Cache hit");
                Ok(Some(response))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss at every level");
                Ok(None)
            }
        }
    }

    /// Store a (query, response) pair; never fails
    pub async fn record(&self, query: &str, response: &str, confidence: f64) -> RecordOutcome {
        self.writer().insert(query, response, confidence).await
    }

    fn lookup_full_message(&self, normalized: &str) -> Option<CachedResponse> {
        let hit = self
            .full_message
            .fresh(normalized, self.config.ttl())
            .and_then(|_| self.full_message.touch(normalized));

        self.count(&self.full_message, hit.is_some());
        hit
    }

    /// Longest matching phrase, then highest confidence, then most recent
    fn lookup_phrase(&self, tokens: &[&str]) -> Option<CachedResponse> {
        let ttl = self.config.ttl();

        let best = ngrams(tokens, self.config.phrase_min_words, self.config.phrase_max_words)
            .into_iter()
            .filter_map(|phrase| {
                let response = self.phrase.fresh(&phrase, ttl)?;
                let length = phrase.split(' ').count();
                Some((phrase, length, response))
            })
            .max_by(|a, b| {
                a.1.cmp(&b.1)
                    .then(a.2.confidence().total_cmp(&b.2.confidence()))
                    .then(a.2.seq().cmp(&b.2.seq()))
            });

        let hit = best.and_then(|(phrase, _, _)| self.phrase.touch(&phrase));

        self.count(&self.phrase, hit.is_some());
        hit
    }

    /// Response backed by the most query words, weighted by confidence
    fn lookup_word(&self, tokens: &[&str]) -> Option<CachedResponse> {
        let ttl = self.config.ttl();
        let mut groups: HashMap<String, (usize, CachedResponse, Vec<&str>)> = HashMap::new();

        for word in content_words(tokens, self.config.min_word_chars) {
            let Some(response) = self.word.fresh(word, ttl) else {
                continue;
            };

            groups
                .entry(response.text().to_string())
                .and_modify(|(count, best, keys)| {
                    *count += 1;
                    keys.push(word);

                    if (response.confidence(), response.seq()) > (best.confidence(), best.seq()) {
                        *best = response.clone();
                    }
                })
                .or_insert_with(|| (1, response.clone(), vec![word]));
        }

        let best = groups.into_values().max_by(|a, b| {
            let score_a = a.0 as f64 * a.1.confidence();
            let score_b = b.0 as f64 * b.1.confidence();

            score_a
                .total_cmp(&score_b)
                .then(a.1.seq().cmp(&b.1.seq()))
        });

        let hit = best.map(|(_, mut response, keys)| {
            for key in keys {
                self.word.touch(key);
            }
            response.touch();
            response
        });

        self.count(&self.word, hit.is_some());
        hit
    }

    async fn lookup_semantic(&self, normalized: &str) -> Result<Option<CachedResponse>, DomainError> {
        let vector = match self.embed(normalized).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "Embedding failed, skipping semantic level");
                self.semantic.counters.miss();
                self.count_metric(CacheLevel::Semantic, false);
                return Ok(None);
            }
        };

        let hit = self.semantic.nearest(
            &vector,
            self.config.semantic_top_k,
            self.config.semantic_max_distance,
            self.config.ttl(),
        )?;

        if hit.is_some() {
            self.semantic.counters.hit();
        } else {
            self.semantic.counters.miss();
        }
        self.count_metric(CacheLevel::Semantic, hit.is_some());

        Ok(hit)
    }

    /// Embed under the configured timeout
    ///
    /// Timeouts and provider errors are reported as embedding errors so the
    /// caller can treat them as a semantic miss.
    pub(super) async fn embed(&self, text: &str) -> Result<Vector, DomainError> {
        let timeout = self.config.embedding_timeout();

        let result = match tokio::time::timeout(timeout, self.embedder.embed(text)).await {
            Ok(Ok(vector)) => Ok(vector),
            Ok(Err(e)) => Err(DomainError::embedding_unavailable(e.to_string())),
            Err(_) => Err(DomainError::embedding_timeout(timeout.as_millis() as u64)),
        };

        if result.is_err() {
            self.embedding_failures.fetch_add(1, Ordering::Relaxed);
            counter!("cache_embedding_failures_total").increment(1);
        }

        result
    }

    pub(super) fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    pub(super) fn record_written(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
        counter!("cache_records_total").increment(1);
    }

    /// Evict over-capacity levels, returning the number of entries dropped
    pub(super) fn enforce_capacity(&self) -> usize {
        let capacity = self.config.level_capacity;
        let batch = self.config.eviction_count();
        let ttl = self.config.ttl();

        let evicted = [&self.full_message, &self.phrase, &self.word]
            .iter()
            .map(|store| store.enforce_capacity(capacity, batch, ttl))
            .sum::<usize>()
            + self.semantic.enforce_capacity(capacity, batch, ttl);

        if evicted > 0 {
            debug!(evicted, "Evicted cache entries");
        }

        evicted
    }

    fn count(&self, store: &KeyedStore, hit: bool) {
        if hit {
            store.counters.hit();
        } else {
            store.counters.miss();
        }

        self.count_metric(store.level(), hit);
    }

    fn count_metric(&self, level: CacheLevel, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        counter!("cache_lookups_total", "level" => level.as_str(), "outcome" => outcome)
            .increment(1);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            full_message: self.full_message.stats(),
            phrase: self.phrase.stats(),
            word: self.word.stats(),
            semantic: self.semantic.stats(),
            lookups: self.lookups.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            embedding_failures: self.embedding_failures.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            index: self.semantic.index_stats(),
        }
    }

    /// Full-message entries in insertion order
    pub fn entries(&self) -> Vec<(String, CachedResponse)> {
        self.full_message.entries()
    }

    pub fn clear(&self) {
        self.full_message.clear();
        self.phrase.clear();
        self.word.clear();
        self.semantic.clear();
        self.lookups.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.embedding_failures.store(0, Ordering::Relaxed);
        self.records.store(0, Ordering::Relaxed);
    }
}

#[async_trait]
impl ResponseCache for MultiLevelCache {
    async fn lookup(&self, query: &str) -> Result<Option<CachedResponse>, DomainError> {
        MultiLevelCache::lookup(self, query).await
    }

    async fn record_at(
        &self,
        query: &str,
        response: &str,
        confidence: f64,
        created_at: DateTime<Utc>,
    ) -> RecordOutcome {
        self.writer()
            .insert_at(query, response, confidence, created_at)
            .await
    }

    fn entries(&self) -> Vec<(String, CachedResponse)> {
        MultiLevelCache::entries(self)
    }

    fn stats(&self) -> CacheStats {
        MultiLevelCache::stats(self)
    }

    fn clear(&self) {
        MultiLevelCache::clear(self)
    }
}
