//! ML client error types.

use thiserror::Error;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("Unsupported fruit type: {fruit}. Supported types: {}", .supported.join(", "))]
    UnsupportedFruitType { fruit: String, supported: Vec<String> },

    #[error("External classifier is not configured")]
    NotConfigured,

    #[error("ML service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MlError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MlError::ServiceUnavailable(_) | MlError::Timeout(_) | MlError::Network(_)
        )
    }

    /// Returns true if the remote service could not be reached or answered
    /// with something unusable.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            MlError::ServiceUnavailable(_)
                | MlError::RequestFailed(_)
                | MlError::InvalidResponse(_)
                | MlError::Timeout(_)
                | MlError::Network(_)
                | MlError::Json(_)
        )
    }
}
