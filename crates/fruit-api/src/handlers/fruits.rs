//! Supported fruit listing.

use axum::extract::State;
use axum::Json;
use fruit_models::RipenessLabel;
use serde::Serialize;

use crate::state::AppState;

/// Fruit tags accepted by each analysis source.
#[derive(Debug, Serialize)]
pub struct FruitsResponse {
    pub local: Vec<String>,
    pub external: Vec<String>,
    /// False when no Roboflow API key is configured
    pub external_enabled: bool,
    pub default_source: String,
    /// Labels the local analyzers can return
    pub labels: Vec<&'static str>,
}

/// List supported fruit types.
pub async fn list_fruits(State(state): State<AppState>) -> Json<FruitsResponse> {
    let external = state.analysis.external();

    Json(FruitsResponse {
        local: state.analysis.registry().fruits(),
        external: external.supported_fruits(),
        external_enabled: external.is_configured(),
        default_source: state.config.default_source.to_string(),
        labels: RipenessLabel::ALL.iter().map(RipenessLabel::as_str).collect(),
    })
}
