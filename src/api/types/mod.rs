//! HTTP request, response and error types

pub mod cache;
pub mod error;
pub mod json;

pub use cache::{CachedAnswer, LookupResponse, QueryRequest, RecordRequest};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
