//! Shared data models for the fruit ripeness analyzer.
//!
//! This crate provides Serde-serializable types for:
//! - Ripeness labels produced by the local color pipeline
//! - Analysis sources (local heuristic or external model)
//! - The analysis result returned over HTTP

pub mod analysis;
pub mod ripeness;

// Re-export common types
pub use analysis::{AnalysisResult, AnalysisSource, AnalysisSourceParseError};
pub use ripeness::RipenessLabel;
