//! Layered response cache
//!
//! Answers LLM queries from a four-level cache before falling back to a
//! generator:
//! - full message: exact normalized query
//! - phrase: shared multi-word phrases
//! - word: shared content words
//! - semantic: nearest neighbour in an O(1) LSH vector index

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use config::{EmbeddingBackend, EmbeddingSettings, GeneratorBackend, GeneratorSettings};
use domain::{DomainError, EmbeddingProvider, FallbackGenerator};
use infrastructure::{
    cache::MultiLevelCache,
    embedding::{HashingEmbeddingProvider, MemoizedEmbeddingProvider, OpenAiEmbeddingProvider},
    generation::{OpenAiGenerator, UnavailableGenerator},
    http::HttpClient,
    services::ResponseService,
};

/// Wire the cache, embedder and generator described by `config`
pub fn build_response_service(config: &AppConfig) -> anyhow::Result<ResponseService> {
    let embedder = build_embedder(&config.embedding, config.cache.embedding_timeout())?;
    let generator = build_generator(&config.generator, config.service.generation_timeout())?;

    let index_config = config
        .index
        .clone()
        .with_dimension(config.embedding.dimensions);

    let cache = MultiLevelCache::new(config.cache.clone(), index_config, embedder)?;

    tracing::info!(
        embedder = config.embedding.provider.as_str(),
        dimensions = config.embedding.dimensions,
        generator = generator.provider_name(),
        "Response service configured"
    );

    Ok(ResponseService::with_config(
        Arc::new(cache),
        generator,
        config.service.clone(),
    ))
}

fn build_embedder(
    settings: &EmbeddingSettings,
    timeout: Duration,
) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
    let memoize = settings.memoize_capacity > 0;

    let embedder: Arc<dyn EmbeddingProvider> = match settings.provider {
        EmbeddingBackend::Hashing => {
            // Hashing is local; never memoized
            Arc::new(HashingEmbeddingProvider::new(settings.dimensions)?)
        }
        EmbeddingBackend::OpenAi => {
            let api_key = settings.api_key.as_deref().ok_or_else(|| {
                DomainError::configuration("embedding.api_key is required for the openai provider")
            })?;

            let base_url = settings
                .base_url
                .as_deref()
                .unwrap_or(infrastructure::embedding::DEFAULT_OPENAI_BASE_URL);

            let mut provider = OpenAiEmbeddingProvider::with_base_url(
                HttpClient::with_timeout(timeout)?,
                api_key,
                base_url,
                settings.dimensions,
            );

            if let Some(model) = &settings.model {
                provider = provider.with_model(model.clone());
            }

            if memoize {
                Arc::new(MemoizedEmbeddingProvider::new(
                    provider,
                    settings.memoize_capacity,
                    settings.memoize_ttl(),
                ))
            } else {
                Arc::new(provider)
            }
        }
    };

    Ok(embedder)
}

fn build_generator(
    settings: &GeneratorSettings,
    timeout: Duration,
) -> Result<Arc<dyn FallbackGenerator>, DomainError> {
    match settings.provider {
        GeneratorBackend::None => Ok(Arc::new(UnavailableGenerator::new())),
        GeneratorBackend::OpenAi => {
            let api_key = settings.api_key.as_deref().ok_or_else(|| {
                DomainError::configuration("generator.api_key is required for the openai provider")
            })?;

            let base_url = settings
                .base_url
                .as_deref()
                .unwrap_or(infrastructure::embedding::DEFAULT_OPENAI_BASE_URL);

            let mut generator =
                OpenAiGenerator::with_base_url(HttpClient::with_timeout(timeout)?, api_key, base_url);

            if let Some(model) = &settings.model {
                generator = generator.with_model(model.clone());
            }
            if let Some(prompt) = &settings.system_prompt {
                generator = generator.with_system_prompt(prompt.clone());
            }
            if let Some(temperature) = settings.temperature {
                generator = generator.with_temperature(temperature);
            }
            if let Some(max_tokens) = settings.max_tokens {
                generator = generator.with_max_tokens(max_tokens);
            }
            if let Some(confidence) = settings.confidence {
                generator = generator.with_confidence(confidence);
            }

            Ok(Arc::new(generator))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_config_builds_offline_service() {
        let service = build_response_service(&AppConfig::default()).unwrap();

        assert_eq!(service.generator_name(), "unavailable");
        assert!(matches!(
            service.answer("anything at all").await,
            Err(DomainError::GenerationFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_index_dimension_follows_embedder() {
        let mut config = AppConfig::default();
        config.embedding.dimensions = 32;

        let service = build_response_service(&config).unwrap();
        let outcome = service.record("capital of france", "Paris.", 0.9).await.unwrap();

        assert!(outcome.semantic);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_openai_without_key_is_configuration_error() {
        let mut config = AppConfig::default();
        config.generator.provider = GeneratorBackend::OpenAi;

        let err = build_response_service(&config).unwrap_err();

        assert!(err.to_string().contains("generator.api_key"));
    }
}
