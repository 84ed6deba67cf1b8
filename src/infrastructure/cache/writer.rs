//! Write path populating every cache level

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::MultiLevelCache;
use crate::domain::cache::normalize::{content_words, is_salient_phrase, ngrams, normalize, words};
use crate::domain::cache::{CacheLevel, CachedResponse, RecordOutcome};

/// Inserts one (query, response) pair into a borrowed cache
///
/// The full message and semantic levels are always written. Phrase and word
/// levels are only written when the confidence reaches the publish threshold,
/// so weak answers cannot leak into fuzzy matches for other queries.
#[derive(Debug, Clone, Copy)]
pub struct CacheWriter<'a> {
    cache: &'a MultiLevelCache,
}

impl<'a> CacheWriter<'a> {
    pub fn new(cache: &'a MultiLevelCache) -> Self {
        Self { cache }
    }

    pub async fn insert(&self, query: &str, response: &str, confidence: f64) -> RecordOutcome {
        self.insert_at(query, response, confidence, Utc::now()).await
    }

    /// Insert with an explicit creation time
    pub async fn insert_at(
        &self,
        query: &str,
        response: &str,
        confidence: f64,
        created_at: DateTime<Utc>,
    ) -> RecordOutcome {
        let mut outcome = RecordOutcome::default();
        let normalized = normalize(query);
        let text = response.trim();

        if normalized.is_empty() {
            warn!("Refusing to cache a response for an empty query");
            outcome.issues.push("empty query".to_string());
            return outcome;
        }

        if text.is_empty() {
            warn!(query = %normalized, "Refusing to cache an empty response");
            outcome.issues.push("empty response".to_string());
            return outcome;
        }

        let confidence = if confidence.is_finite() { confidence } else { 0.0 };
        let config = self.cache.config();
        let entry = CachedResponse::new(
            text,
            confidence,
            CacheLevel::FullMessage,
            self.cache.next_seq(),
        )
        .with_created_at(created_at);

        self.cache.full_message.insert(normalized.clone(), entry.clone());
        outcome.full_message = true;

        if entry.confidence() >= config.publish_threshold {
            let tokens = words(&normalized);

            for phrase in ngrams(&tokens, config.phrase_min_words, config.phrase_max_words) {
                if is_salient_phrase(&phrase, config.min_phrase_chars) {
                    self.cache.phrase.insert(phrase, entry.clone());
                    outcome.phrases += 1;
                }
            }

            for word in content_words(&tokens, config.min_word_chars) {
                self.cache.word.insert(word.to_string(), entry.clone());
                outcome.words += 1;
            }
        } else {
            debug!(
                query = %normalized,
                confidence = entry.confidence(),
                threshold = config.publish_threshold,
                "Below publish threshold, skipping phrase and word levels"
            );
        }

        match self.cache.embed(&normalized).await {
            Ok(vector) => match self.cache.semantic.insert(normalized.clone(), vector, &entry) {
                Ok(_) => outcome.semantic = true,
                Err(e) => {
                    warn!(query = %normalized, error = %e, "Failed to index response");
                    outcome.issues.push(e.to_string());
                }
            },
            Err(e) => {
                warn!(query = %normalized, error = %e, "Skipping semantic level");
                outcome.issues.push(e.to_string());
            }
        }

        outcome.evicted = self.cache.enforce_capacity();
        self.cache.record_written();

        debug!(
            query = %normalized,
            levels = ?outcome.levels(),
            evicted = outcome.evicted,
            "Recorded response"
        );

        outcome
    }
}
