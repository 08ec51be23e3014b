//! Roboflow request/response types.

use serde::{Deserialize, Serialize};

/// One class prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub class: String,
    pub confidence: f64,
}

/// Classification response body.
///
/// Classification models fill `predictions`; single-label projects may
/// also report the winner in `top` / `confidence`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoboflowResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Label and confidence returned by the external model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    /// In `[0, 1]`
    pub confidence: f64,
}
