//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, EmbeddingBackend, EmbeddingSettings, GeneratorBackend, GeneratorSettings,
    LogFormat, LoggingConfig, ServerConfig, SnapshotSettings,
};
