//! Application state.

use std::sync::Arc;

use fruit_ml_client::{MlResult, RoboflowClient};

use crate::config::ApiConfig;
use crate::middleware::IpRateLimiter;
use crate::services::{AnalysisService, AnalyzerRegistry};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analysis: AnalysisService,
    pub rate_limiter: Arc<IpRateLimiter>,
}

impl AppState {
    /// Create application state with the built-in analyzers.
    pub fn new(config: ApiConfig) -> MlResult<Self> {
        let registry = AnalyzerRegistry::with_defaults(config.banana_policy);
        let external = RoboflowClient::new(config.roboflow.clone())?;
        Ok(Self::with_services(config, AnalysisService::new(registry, external)))
    }

    /// Create application state around an existing analysis service.
    pub fn with_services(config: ApiConfig, analysis: AnalysisService) -> Self {
        let rate_limiter = Arc::new(IpRateLimiter::new(
            config.rate_limit_rps,
            config.rate_limit_burst,
        ));

        Self {
            config,
            analysis,
            rate_limiter,
        }
    }
}
