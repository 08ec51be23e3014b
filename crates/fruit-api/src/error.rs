//! API error types.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fruit_ml_client::MlError;
use fruit_vision::VisionError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported fruit type: {fruit}. Supported types: {}", .supported.join(", "))]
    UnsupportedFruit { fruit: String, supported: Vec<String> },

    #[error("Invalid image: {0}")]
    Decode(#[from] VisionError),

    #[error("External classifier unavailable: {0}")]
    ExternalUnavailable(String),

    #[error("External classifier error: {0}")]
    Upstream(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UnsupportedFruit { .. } => StatusCode::BAD_REQUEST,
            ApiError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ExternalUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::UnsupportedFruit { .. } => "unsupported_fruit",
            ApiError::Decode(_) => "decode_error",
            ApiError::ExternalUnavailable(_) => "external_unavailable",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::RateLimited => "rate_limited",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<MlError> for ApiError {
    fn from(err: MlError) -> Self {
        match err {
            MlError::UnsupportedFruitType { fruit, supported } => {
                ApiError::UnsupportedFruit { fruit, supported }
            }
            MlError::NotConfigured => {
                ApiError::ExternalUnavailable("no Roboflow API key configured".to_string())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        // Body limits surface mid-stream when no Content-Length was sent
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(format!("Failed to read upload: {}", err.body_text()))
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details go to the log, never to the client
        let detail = match &self {
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            detail,
            code: Some(self.code().to_string()),
        };

        (status, Json(body)).into_response()
    }
}
