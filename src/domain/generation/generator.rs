use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Text produced by a fallback generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    /// Quality estimate in 0.0..=1.0
    pub confidence: f64,
}

impl Generation {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Expensive backend invoked only when every cache level misses
#[async_trait]
pub trait FallbackGenerator: Send + Sync + Debug {
    async fn generate(&self, query: &str) -> Result<Generation, DomainError>;

    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug)]
    pub struct MockGenerator {
        response: Option<Generation>,
        error: Option<String>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl MockGenerator {
        pub fn new() -> Self {
            Self {
                response: None,
                error: None,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_response(mut self, text: impl Into<String>, confidence: f64) -> Self {
            self.response = Some(Generation::new(text, confidence));
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl Default for MockGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl FallbackGenerator for MockGenerator {
        async fn generate(&self, _query: &str) -> Result<Generation, DomainError> {
            self.calls.fetch_add(1, Ordering::Relaxed);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }

            self.response
                .clone()
                .ok_or_else(|| DomainError::provider("mock", "No mock response configured"))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_confidence_clamped() {
        assert_eq!(Generation::new("x", 2.0).confidence, 1.0);
        assert_eq!(Generation::new("x", -1.0).confidence, 0.0);
    }

    #[tokio::test]
    async fn test_mock_generator() {
        let generator = mock::MockGenerator::new().with_response("answer", 0.9);
        let generation = generator.generate("question").await.unwrap();

        assert_eq!(generation.text, "answer");
        assert_eq!(generator.calls(), 1);
    }
}
