use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::CacheConfig;
use crate::domain::vector_index::IndexConfig;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::services::ResponseServiceConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub service: ResponseServiceConfig,
    #[serde(default)]
    pub snapshot: SnapshotSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which embedding backend feeds the semantic level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local feature hashing, no network
    #[default]
    Hashing,
    OpenAi,
}

impl EmbeddingBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hashing => "hashing",
            Self::OpenAi => "openai",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub provider: EmbeddingBackend,

    /// Vector dimension; the index is built with the same value
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    /// Memoized vectors; 0 disables memoization
    #[serde(default = "default_memoize_capacity")]
    pub memoize_capacity: u64,

    #[serde(default = "default_memoize_ttl_secs")]
    pub memoize_ttl_secs: u64,
}

fn default_embedding_dimensions() -> usize {
    256
}

fn default_memoize_capacity() -> u64 {
    10_000
}

fn default_memoize_ttl_secs() -> u64 {
    3600
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::default(),
            dimensions: default_embedding_dimensions(),
            api_key: None,
            base_url: None,
            model: None,
            memoize_capacity: default_memoize_capacity(),
            memoize_ttl_secs: default_memoize_ttl_secs(),
        }
    }
}

impl EmbeddingSettings {
    pub fn memoize_ttl(&self) -> Duration {
        Duration::from_secs(self.memoize_ttl_secs)
    }
}

/// Which backend answers full cache misses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorBackend {
    /// Cache-only mode: every miss is a generation failure
    #[default]
    None,
    OpenAi,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GeneratorSettings {
    #[serde(default)]
    pub provider: GeneratorBackend,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub system_prompt: Option<String>,

    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Confidence attached to a complete answer
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SnapshotSettings {
    /// Restored on start and saved on shutdown when set
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = from_toml("");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.embedding.provider, EmbeddingBackend::Hashing);
        assert_eq!(config.generator.provider, GeneratorBackend::None);
        assert_eq!(config.cache.publish_threshold, CacheConfig::default().publish_threshold);
        assert!(config.snapshot.path.is_none());
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [logging]
            level = "debug"
            format = "json"

            [cache]
            publish_threshold = 0.5

            [embedding]
            provider = "openai"
            dimensions = 64
            api_key = "sk-test"

            [generator]
            provider = "openai"
            model = "gpt-4o"

            [snapshot]
            path = "/tmp/cache.json"
            "#,
        );

        assert_eq!(config.server.port, 9000);
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.cache.publish_threshold, 0.5);
        assert_eq!(config.embedding.provider, EmbeddingBackend::OpenAi);
        assert_eq!(config.embedding.dimensions, 64);
        assert_eq!(config.generator.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.snapshot.path, Some(PathBuf::from("/tmp/cache.json")));
    }
}
