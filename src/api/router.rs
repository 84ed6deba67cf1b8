use axum::{middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
///
/// The Prometheus endpoint is merged at `metrics_path` when metrics are
/// enabled.
pub fn create_router(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .nest("/v1", v1::create_v1_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware));

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m, metrics_path));
    }

    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::cache::CacheConfig;
    use crate::domain::generation::MockGenerator;
    use crate::domain::vector_index::IndexConfig;
    use crate::infrastructure::cache::MultiLevelCache;
    use crate::infrastructure::embedding::HashingEmbeddingProvider;
    use crate::infrastructure::services::ResponseService;

    fn app(generator: MockGenerator) -> Router {
        let embedder = Arc::new(HashingEmbeddingProvider::new(64).unwrap());
        let cache =
            MultiLevelCache::new(CacheConfig::default(), IndexConfig::new(64), embedder).unwrap();
        let service = ResponseService::new(Arc::new(cache), Arc::new(generator));

        create_router(AppState::new(Arc::new(service)), None, "/metrics")
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(MockGenerator::new())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_query_generates_then_hits_cache() {
        let app = app(MockGenerator::new().with_response("Light is fast.", 0.9));

        let first = app
            .clone()
            .oneshot(post("/v1/query", json!({"query": "speed of light"})))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(body_json(first).await["source"]["type"], "generated");

        let second = app
            .oneshot(post("/v1/query", json!({"query": "speed of light"})))
            .await
            .unwrap();
        let json = body_json(second).await;
        assert_eq!(json["source"]["type"], "cached");
        assert_eq!(json["source"]["level"], "full_message");
        assert_eq!(json["text"], "Light is fast.");
    }

    #[tokio::test]
    async fn test_query_generation_failure_is_503() {
        let response = app(MockGenerator::new().with_error("offline"))
            .oneshot(post("/v1/query", json!({"query": "anything"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "generation_failed");
    }

    #[tokio::test]
    async fn test_empty_query_is_400() {
        let response = app(MockGenerator::new())
            .oneshot(post("/v1/lookup", json!({"query": "   "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_record_lookup_and_stats() {
        let app = app(MockGenerator::new());

        let recorded = app
            .clone()
            .oneshot(post(
                "/v1/record",
                json!({"query": "capital of france", "response": "Paris.", "confidence": 0.9}),
            ))
            .await
            .unwrap();
        assert_eq!(recorded.status(), StatusCode::OK);
        assert_eq!(body_json(recorded).await["full_message"], true);

        let hit = app
            .clone()
            .oneshot(post("/v1/lookup", json!({"query": "Capital of France"})))
            .await
            .unwrap();
        let json = body_json(hit).await;
        assert_eq!(json["hit"], true);
        assert_eq!(json["answer"]["text"], "Paris.");

        let stats = app
            .oneshot(Request::get("/v1/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(stats).await;
        assert_eq!(json["records"], 1);
        assert_eq!(json["full_message"]["entries"], 1);
    }

    #[tokio::test]
    async fn test_record_rejects_bad_confidence() {
        let response = app(MockGenerator::new())
            .oneshot(post(
                "/v1/record",
                json!({"query": "q", "response": "r", "confidence": 2.0}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/query")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .unwrap();

        let response = app(MockGenerator::new()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "invalid_request_error");
    }
}
