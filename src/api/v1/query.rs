//! Query endpoint handler

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, QueryRequest};
use crate::infrastructure::services::Answer;

/// POST /v1/query
///
/// Answers from cache, falling back to the generator on a full miss.
pub async fn answer_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Answer>, ApiError> {
    debug!(query_len = request.query.len(), "Answering query");

    let answer = state.service.answer(&request.query).await?;

    Ok(Json(answer))
}
