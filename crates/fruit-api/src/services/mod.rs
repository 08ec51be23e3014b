//! Analysis services.

pub mod analysis;
pub mod registry;

pub use analysis::AnalysisService;
pub use registry::AnalyzerRegistry;
