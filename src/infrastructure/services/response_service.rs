//! Response service
//!
//! Answers queries from the multi-level cache and falls back to generation
//! on a full miss, recording generated answers for next time.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::cache::{CacheLevel, CacheStats, CachedResponse, RecordOutcome, ResponseCache};
use crate::domain::generation::{FallbackGenerator, Generation};
use crate::domain::DomainError;
use crate::infrastructure::cache::{restore_snapshot, save_snapshot};

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerSource {
    Cached { level: CacheLevel },
    Generated,
}

/// Answer returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub confidence: f64,
    pub source: AnswerSource,
    /// Present when a generated answer was written to the cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<RecordOutcome>,
}

impl Answer {
    pub fn is_cached(&self) -> bool {
        matches!(self.source, AnswerSource::Cached { .. })
    }
}

impl From<CachedResponse> for Answer {
    fn from(response: CachedResponse) -> Self {
        Self {
            source: AnswerSource::Cached {
                level: response.level(),
            },
            confidence: response.confidence(),
            text: response.text().to_string(),
            recorded: None,
        }
    }
}

/// Response service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseServiceConfig {
    /// Bound on a single fallback generation
    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,

    /// Generated answers below this confidence are returned but not cached
    #[serde(default)]
    pub min_record_confidence: f64,
}

fn default_generation_timeout_ms() -> u64 {
    30000
}

impl Default for ResponseServiceConfig {
    fn default() -> Self {
        Self {
            generation_timeout_ms: default_generation_timeout_ms(),
            min_record_confidence: 0.0,
        }
    }
}

impl ResponseServiceConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_min_record_confidence(mut self, confidence: f64) -> Self {
        self.min_record_confidence = confidence;
        self
    }
}

/// Lookup, then generate, then record
#[derive(Debug)]
pub struct ResponseService {
    cache: Arc<dyn ResponseCache>,
    generator: Arc<dyn FallbackGenerator>,
    config: ResponseServiceConfig,
}

impl ResponseService {
    pub fn new(cache: Arc<dyn ResponseCache>, generator: Arc<dyn FallbackGenerator>) -> Self {
        Self::with_config(cache, generator, ResponseServiceConfig::default())
    }

    pub fn with_config(
        cache: Arc<dyn ResponseCache>,
        generator: Arc<dyn FallbackGenerator>,
        config: ResponseServiceConfig,
    ) -> Self {
        Self {
            cache,
            generator,
            config,
        }
    }

    pub fn config(&self) -> &ResponseServiceConfig {
        &self.config
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.provider_name()
    }

    /// Answer from cache, falling back to the generator on a full miss
    ///
    /// A failed or timed-out generation is reported as `GenerationFailure`;
    /// nothing is cached in that case.
    pub async fn answer(&self, query: &str) -> Result<Answer, DomainError> {
        if let Some(cached) = self.cache.lookup(query).await? {
            debug!(level = %cached.level(), "Answered from cache");
            return Ok(cached.into());
        }

        let generation = self.generate(query).await?;

        let recorded = if generation.confidence >= self.config.min_record_confidence {
            Some(
                self.cache
                    .record(query, &generation.text, generation.confidence)
                    .await,
            )
        } else {
            debug!(
                confidence = generation.confidence,
                min = self.config.min_record_confidence,
                "Generated answer too weak to cache"
            );
            None
        };

        Ok(Answer {
            text: generation.text,
            confidence: generation.confidence,
            source: AnswerSource::Generated,
            recorded,
        })
    }

    async fn generate(&self, query: &str) -> Result<Generation, DomainError> {
        let timeout = self.config.generation_timeout();
        let provider = self.generator.provider_name();

        let result = match tokio::time::timeout(timeout, self.generator.generate(query)).await {
            Err(_) => Err(("timeout", format!("timed out after {}ms", timeout.as_millis()))),
            Ok(Err(DomainError::GenerationFailure { message })) => Err(("error", message)),
            Ok(Err(e)) => Err(("error", e.to_string())),
            Ok(Ok(generation)) if generation.text.trim().is_empty() => {
                Err(("empty", "generator returned an empty answer".to_string()))
            }
            Ok(Ok(generation)) => Ok(generation),
        };

        match result {
            Ok(generation) => {
                counter!("fallback_generations_total", "status" => "success").increment(1);
                info!(provider, confidence = generation.confidence, "Generated fallback answer");
                Ok(generation)
            }
            Err((status, message)) => {
                counter!("fallback_generations_total", "status" => status).increment(1);
                warn!(provider, status, error = %message, "Fallback generation failed");
                Err(DomainError::generation_failure(message))
            }
        }
    }

    pub async fn lookup(&self, query: &str) -> Result<Option<CachedResponse>, DomainError> {
        self.cache.lookup(query).await
    }

    /// Record a pair supplied by the caller
    pub async fn record(
        &self,
        query: &str,
        response: &str,
        confidence: f64,
    ) -> Result<RecordOutcome, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::EmptyQuery);
        }

        if response.trim().is_empty() {
            return Err(DomainError::validation("response must not be empty"));
        }

        if !(0.0..=1.0).contains(&confidence) {
            return Err(DomainError::validation("confidence must be within 0.0..=1.0"));
        }

        Ok(self.cache.record(query, response, confidence).await)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub async fn save_snapshot(&self, path: &Path) -> Result<usize, DomainError> {
        save_snapshot(self.cache.as_ref(), path).await
    }

    pub async fn restore_snapshot(&self, path: &Path) -> Result<usize, DomainError> {
        restore_snapshot(self.cache.as_ref(), path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockResponseCache;
    use crate::domain::generation::MockGenerator;

    fn service(
        cache: MockResponseCache,
        generator: MockGenerator,
    ) -> (ResponseService, Arc<MockResponseCache>, Arc<MockGenerator>) {
        let cache = Arc::new(cache);
        let generator = Arc::new(generator);
        let service = ResponseService::new(cache.clone(), generator.clone());
        (service, cache, generator)
    }

    #[tokio::test]
    async fn test_cache_hit_skips_generator() {
        let (service, _, generator) = service(
            MockResponseCache::new().with_entry("hello", "cached hi", 0.9),
            MockGenerator::new().with_response("generated hi", 0.9),
        );

        let answer = service.answer("hello").await.unwrap();

        assert_eq!(answer.text, "cached hi");
        assert_eq!(
            answer.source,
            AnswerSource::Cached {
                level: CacheLevel::FullMessage
            }
        );
        assert!(answer.is_cached());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_generates_and_records() {
        let (service, cache, generator) = service(
            MockResponseCache::new(),
            MockGenerator::new().with_response("generated", 0.8),
        );

        let answer = service.answer("question").await.unwrap();

        assert_eq!(answer.source, AnswerSource::Generated);
        assert!(answer.recorded.is_some());
        assert_eq!(generator.calls(), 1);

        let second = service.answer("question").await.unwrap();
        assert!(second.is_cached());
        assert_eq!(generator.calls(), 1);
        assert_eq!(cache.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_propagates_and_caches_nothing() {
        let (service, cache, _) = service(
            MockResponseCache::new(),
            MockGenerator::new().with_error("backend down"),
        );

        let result = service.answer("question").await;

        match result {
            Err(DomainError::GenerationFailure { message }) => {
                assert!(message.contains("backend down"));
            }
            other => panic!("expected generation failure, got {:?}", other),
        }
        assert!(cache.entries().is_empty());
    }

    #[tokio::test]
    async fn test_generation_timeout() {
        let cache = Arc::new(MockResponseCache::new());
        let generator = Arc::new(
            MockGenerator::new()
                .with_response("late", 0.9)
                .with_delay(Duration::from_millis(200)),
        );
        let config =
            ResponseServiceConfig::default().with_generation_timeout(Duration::from_millis(20));
        let service = ResponseService::with_config(cache.clone(), generator, config);

        let result = service.answer("question").await;

        assert!(matches!(result, Err(DomainError::GenerationFailure { .. })));
        assert!(cache.entries().is_empty());
    }

    #[tokio::test]
    async fn test_empty_generation_is_failure() {
        let (service, cache, _) = service(
            MockResponseCache::new(),
            MockGenerator::new().with_response("   ", 0.9),
        );

        assert!(service.answer("question").await.is_err());
        assert!(cache.entries().is_empty());
    }

    #[tokio::test]
    async fn test_weak_generation_returned_but_not_cached() {
        let cache = Arc::new(MockResponseCache::new());
        let generator = Arc::new(MockGenerator::new().with_response("maybe", 0.1));
        let config = ResponseServiceConfig::default().with_min_record_confidence(0.5);
        let service = ResponseService::with_config(cache.clone(), generator, config);

        let answer = service.answer("question").await.unwrap();

        assert_eq!(answer.text, "maybe");
        assert!(answer.recorded.is_none());
        assert!(cache.entries().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (service, _, generator) = service(
            MockResponseCache::new(),
            MockGenerator::new().with_response("x", 0.9),
        );

        assert!(matches!(
            service.answer("  ").await,
            Err(DomainError::EmptyQuery)
        ));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_record_validation() {
        let (service, _, _) = service(MockResponseCache::new(), MockGenerator::new());

        assert!(matches!(
            service.record("", "x", 0.5).await,
            Err(DomainError::EmptyQuery)
        ));
        assert!(service.record("q", " ", 0.5).await.is_err());
        assert!(service.record("q", "x", 1.5).await.is_err());
        assert!(service.record("q", "x", 0.5).await.unwrap().full_message);
    }

    #[test]
    fn test_answer_source_serialization() {
        let json = serde_json::to_value(AnswerSource::Cached {
            level: CacheLevel::Phrase,
        })
        .unwrap();

        assert_eq!(json["type"], "cached");
        assert_eq!(json["level"], "phrase");
    }
}
