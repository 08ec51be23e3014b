//! Axum HTTP API for fruit ripeness analysis.
//!
//! This crate provides:
//! - `POST /analyze` taking a multipart photo and a fruit type
//! - Local color-statistics analysis and external model delegation
//! - Request IDs, rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shutdown;
pub mod state;

pub use config::{ApiConfig, LogConfig, LogFormat};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{AnalysisService, AnalyzerRegistry};
pub use state::AppState;
