//! Ripeness analysis handler.

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::Extension;
use axum::Json;
use fruit_models::{AnalysisResult, AnalysisSource};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestId;
use crate::state::AppState;

/// Multipart field carrying the photo.
pub const IMAGE_FIELD: &str = "image";

/// Query parameters for `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    /// Fruit tag, e.g. `banana`
    #[serde(rename = "type")]
    pub fruit_type: Option<String>,
    /// `local` or `external`; the configured default when absent
    pub source: Option<String>,
}

/// Analyze an uploaded fruit photo.
pub async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
    request_id: Option<Extension<RequestId>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let fruit_type = query
        .fruit_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'type' is required"))?;

    let source = match query.source.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<AnalysisSource>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => state.config.default_source,
    };

    let image = read_image_field(multipart?).await?;
    debug!(
        request_id = request_id.as_ref().map(|Extension(id)| id.0.as_str()).unwrap_or_default(),
        fruit = %fruit_type,
        source = %source,
        bytes = image.len(),
        "Received upload"
    );

    let result = state.analysis.analyze(fruit_type, source, image).await?;
    Ok(Json(result))
}

/// Read the first `image` field, skipping any others.
async fn read_image_field(mut multipart: Multipart) -> ApiResult<Bytes> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(ApiError::bad_request("Uploaded image is empty"));
        }
        return Ok(data);
    }

    Err(ApiError::bad_request(format!(
        "Multipart field '{}' is required",
        IMAGE_FIELD
    )))
}
