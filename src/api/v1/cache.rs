//! Cache-only endpoint handlers

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, LookupResponse, QueryRequest, RecordRequest};
use crate::domain::cache::{CacheStats, RecordOutcome};

/// POST /v1/lookup
///
/// Never calls the generator; a miss is `{"hit": false}`.
pub async fn lookup(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<LookupResponse>, ApiError> {
    let hit = state.service.lookup(&request.query).await?;

    debug!(hit = hit.is_some(), "Cache lookup");

    Ok(Json(hit.into()))
}

/// POST /v1/record
pub async fn record(
    State(state): State<AppState>,
    Json(request): Json<RecordRequest>,
) -> Result<Json<RecordOutcome>, ApiError> {
    let outcome = state
        .service
        .record(&request.query, &request.response, request.confidence)
        .await?;

    Ok(Json(outcome))
}

/// GET /v1/stats
pub async fn stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.service.stats())
}
