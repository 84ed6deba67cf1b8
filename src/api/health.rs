//! Health check endpoint

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub checks: Vec<HealthCheck>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /health
///
/// Always 200 while the process serves requests. Running without a
/// generator is reported as degraded since misses cannot be answered.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.service.stats();
    let generator = state.service.generator_name();

    let cache = HealthCheck {
        name: "cache".to_string(),
        status: HealthStatus::Healthy,
        message: Some(format!("{} entries", stats.full_message.entries)),
    };

    let generator_check = if generator == "unavailable" {
        HealthCheck {
            name: "generator".to_string(),
            status: HealthStatus::Degraded,
            message: Some("no generator configured, misses fail".to_string()),
        }
    } else {
        HealthCheck {
            name: "generator".to_string(),
            status: HealthStatus::Healthy,
            message: Some(generator.to_string()),
        }
    };

    let checks = vec![cache, generator_check];
    let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Degraded,
            version: "1.0.0".to_string(),
            checks: vec![HealthCheck {
                name: "generator".to_string(),
                status: HealthStatus::Degraded,
                message: None,
            }],
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"degraded\""));
        assert!(json.contains("\"name\":\"generator\""));
        assert!(!json.contains("message"));
    }
}
