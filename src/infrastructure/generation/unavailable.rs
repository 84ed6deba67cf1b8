use async_trait::async_trait;

use crate::domain::generation::{FallbackGenerator, Generation};
use crate::domain::DomainError;

/// Generator for offline deployments; every call fails
#[derive(Debug, Clone, Default)]
pub struct UnavailableGenerator;

impl UnavailableGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FallbackGenerator for UnavailableGenerator {
    async fn generate(&self, _query: &str) -> Result<Generation, DomainError> {
        Err(DomainError::generation_failure("no fallback generator configured"))
    }

    fn provider_name(&self) -> &'static str {
        "unavailable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_fails() {
        let result = UnavailableGenerator::new().generate("anything").await;

        assert!(matches!(result, Err(DomainError::GenerationFailure { .. })));
    }
}
