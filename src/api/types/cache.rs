//! Request and response bodies for the cache endpoints

use serde::{Deserialize, Serialize};

use crate::domain::cache::{CacheLevel, CachedResponse};

/// Body of `POST /v1/query` and `POST /v1/lookup`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Body of `POST /v1/record`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRequest {
    pub query: String,
    pub response: String,
    #[serde(default = "default_record_confidence")]
    pub confidence: f64,
}

fn default_record_confidence() -> f64 {
    1.0
}

/// A cached answer as returned by `POST /v1/lookup`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnswer {
    pub text: String,
    pub confidence: f64,
    pub level: CacheLevel,
}

impl From<CachedResponse> for CachedAnswer {
    fn from(response: CachedResponse) -> Self {
        Self {
            level: response.level(),
            confidence: response.confidence(),
            text: response.text().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    pub hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<CachedAnswer>,
}

impl From<Option<CachedResponse>> for LookupResponse {
    fn from(response: Option<CachedResponse>) -> Self {
        Self {
            hit: response.is_some(),
            answer: response.map(CachedAnswer::from),
        }
    }
}
