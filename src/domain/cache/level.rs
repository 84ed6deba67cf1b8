//! Cache levels in lookup order

use std::fmt;

use serde::{Deserialize, Serialize};

/// Granularity at which a cached response was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheLevel {
    FullMessage,
    Phrase,
    Word,
    Semantic,
}

impl CacheLevel {
    /// Every level, exact before fuzzy
    pub const LOOKUP_ORDER: [CacheLevel; 4] = [
        CacheLevel::FullMessage,
        CacheLevel::Phrase,
        CacheLevel::Word,
        CacheLevel::Semantic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheLevel::FullMessage => "full_message",
            CacheLevel::Phrase => "phrase",
            CacheLevel::Word => "word",
            CacheLevel::Semantic => "semantic",
        }
    }

    /// Whether the level is keyed by normalized text rather than a vector
    pub fn is_keyed(&self) -> bool {
        !matches!(self, CacheLevel::Semantic)
    }
}

impl fmt::Display for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
