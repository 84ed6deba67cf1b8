//! Versioned cache API

pub mod cache;
pub mod query;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::answer_query))
        .route("/lookup", post(cache::lookup))
        .route("/record", post(cache::record))
        .route("/stats", get(cache::stats))
}
