//! Embedding provider implementations

mod hashing;
mod memoized;
mod openai;

pub use hashing::HashingEmbeddingProvider;
pub use memoized::MemoizedEmbeddingProvider;
pub use openai::{OpenAiEmbeddingProvider, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL};
