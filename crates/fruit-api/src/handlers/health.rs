//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub analyzers: CheckStatus,
    pub external: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckStatus {
    fn new(status: &str, detail: Option<String>) -> Self {
        Self {
            status: status.to_string(),
            detail,
        }
    }
}

/// Readiness check endpoint (readiness).
///
/// Fails only when no local analyzer is registered. A missing Roboflow key
/// reports the external check as `disabled` without failing readiness.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let registry = state.analysis.registry();
    let analyzers = if registry.is_empty() {
        CheckStatus::new("error", Some("no analyzers registered".to_string()))
    } else {
        CheckStatus::new("ok", Some(registry.fruits().join(",")))
    };

    let external_client = state.analysis.external();
    let external = if external_client.is_configured() {
        CheckStatus::new("ok", Some(external_client.supported_fruits().join(",")))
    } else {
        CheckStatus::new("disabled", Some("ROBOFLOW_API_KEY not set".to_string()))
    };

    let all_ok = analyzers.status == "ok";
    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks { analyzers, external },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
