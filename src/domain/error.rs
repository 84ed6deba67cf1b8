use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty query")]
    EmptyQuery,

    #[error("Embedding timed out after {timeout_ms}ms")]
    EmbeddingTimeout { timeout_ms: u64 },

    #[error("Embedding unavailable: {message}")]
    EmbeddingUnavailable { message: String },

    #[error("No cached answer, generation failed: {message}")]
    GenerationFailure { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    pub fn embedding_timeout(timeout_ms: u64) -> Self {
        Self::EmbeddingTimeout { timeout_ms }
    }

    pub fn embedding_unavailable(message: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable {
            message: message.into(),
        }
    }

    pub fn generation_failure(message: impl Into<String>) -> Self {
        Self::GenerationFailure {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error violates a caller contract (bad input) rather than
    /// reflecting a collaborator failure
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::EmptyQuery | Self::Validation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_error() {
        let error = DomainError::dimension_mismatch(128, 64);
        assert_eq!(error.to_string(), "Dimension mismatch: expected 128, got 64");
        assert!(error.is_contract_violation());
    }

    #[test]
    fn test_empty_query_error() {
        let error = DomainError::EmptyQuery;
        assert_eq!(error.to_string(), "Empty query");
        assert!(error.is_contract_violation());
    }

    #[test]
    fn test_generation_failure_reads_as_no_cached_answer() {
        let error = DomainError::generation_failure("upstream returned 500");
        assert_eq!(
            error.to_string(),
            "No cached answer, generation failed: upstream returned 500"
        );
        assert!(!error.is_contract_violation());
    }

    #[test]
    fn test_embedding_errors_are_not_contract_violations() {
        assert!(!DomainError::embedding_timeout(250).is_contract_violation());
        assert!(!DomainError::embedding_unavailable("down").is_contract_violation());
    }
}
