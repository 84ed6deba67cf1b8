//! Local feature-hashing embedding provider

use async_trait::async_trait;

use crate::domain::cache::normalize::{is_stopword, normalize, words};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::vector_index::{normalize as unit_length, Vector};
use crate::domain::DomainError;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic bag-of-features embedding, no network involved
///
/// Content words and their character trigrams are hashed into a fixed
/// number of signed buckets and the result is scaled to unit length.
/// Stopwords are ignored so two queries are close only when they share
/// topical words; "what is food" and "what is creativity" stay far apart.
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    pub fn new(dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "Embedding dimensions must be at least 1",
            ));
        }

        Ok(Self { dimensions })
    }

    /// Embed synchronously
    pub fn embed_text(&self, text: &str) -> Vector {
        let normalized = normalize(text);
        let tokens = words(&normalized);

        let mut content: Vec<&str> = tokens.iter().copied().filter(|w| !is_stopword(w)).collect();
        if content.is_empty() {
            content = tokens;
        }

        let mut vector = vec![0.0f32; self.dimensions];

        for word in content {
            self.add_feature(&mut vector, word.as_bytes(), WORD_WEIGHT);

            let padded: Vec<char> = std::iter::once('^')
                .chain(word.chars())
                .chain(std::iter::once('$'))
                .collect();

            for trigram in padded.windows(3) {
                let feature: String = trigram.iter().collect();
                self.add_feature(&mut vector, feature.as_bytes(), TRIGRAM_WEIGHT);
            }
        }

        unit_length(&mut vector);
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };

        vector[bucket] += sign * weight;
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vector, DomainError> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &'static str {
        "hashing"
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
        (hash ^ *byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
