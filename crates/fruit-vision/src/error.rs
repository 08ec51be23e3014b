//! Error types for image analysis.

use thiserror::Error;

/// Result type for analysis operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors raised by the local analysis pipeline.
///
/// Both variants are decode failures: the uploaded bytes could not be turned
/// into pixels. Classification itself cannot fail.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

impl VisionError {
    /// Create an unsupported format error.
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat(message.into())
    }
}
