//! Analysis result types shared by the API and its collaborators.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ripeness::RipenessLabel;

/// Where a ripeness classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// Pixel color statistics computed in-process.
    #[default]
    Local,
    /// Hosted image-classification model.
    External,
}

impl AnalysisSource {
    /// Returns the source name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::Local => "local",
            AnalysisSource::External => "external",
        }
    }
}

impl fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalysisSource {
    type Err = AnalysisSourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "heuristic" => Ok(AnalysisSource::Local),
            "external" | "model" | "roboflow" => Ok(AnalysisSource::External),
            _ => Err(AnalysisSourceParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown analysis source: {0}")]
pub struct AnalysisSourceParseError(String);

/// Result of analyzing one uploaded photo.
///
/// `ripeness_level` is a free-form string because the external model
/// reports its own class names; the local path always emits a
/// [`RipenessLabel`] tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub fruit_type: String,
    pub ripeness_level: String,
    /// Only present for external classifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub source: AnalysisSource,
}

impl AnalysisResult {
    /// Build a result from the local color pipeline.
    pub fn local(fruit_type: impl Into<String>, label: RipenessLabel) -> Self {
        Self {
            fruit_type: fruit_type.into(),
            ripeness_level: label.as_str().to_string(),
            confidence: None,
            source: AnalysisSource::Local,
        }
    }

    /// Build a result from the external model.
    pub fn external(
        fruit_type: impl Into<String>,
        class: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            fruit_type: fruit_type.into(),
            ripeness_level: class.into(),
            confidence: Some(confidence),
            source: AnalysisSource::External,
        }
    }
}
