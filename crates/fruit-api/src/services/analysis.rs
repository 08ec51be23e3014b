//! Ripeness analysis dispatch.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use fruit_ml_client::RoboflowClient;
use fruit_models::{AnalysisResult, AnalysisSource};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::registry::AnalyzerRegistry;

/// Routes an uploaded photo to a local analyzer or the external model.
#[derive(Clone)]
pub struct AnalysisService {
    registry: AnalyzerRegistry,
    external: Arc<RoboflowClient>,
}

impl AnalysisService {
    pub fn new(registry: AnalyzerRegistry, external: RoboflowClient) -> Self {
        Self {
            registry,
            external: Arc::new(external),
        }
    }

    pub fn registry(&self) -> &AnalyzerRegistry {
        &self.registry
    }

    pub fn external(&self) -> &RoboflowClient {
        &self.external
    }

    /// Analyze one photo of `fruit_type`.
    pub async fn analyze(
        &self,
        fruit_type: &str,
        source: AnalysisSource,
        image: Bytes,
    ) -> ApiResult<AnalysisResult> {
        let fruit = fruit_type.trim().to_lowercase();
        if fruit.is_empty() {
            return Err(ApiError::bad_request("Fruit type must not be empty"));
        }

        let start = Instant::now();
        let result = match source {
            AnalysisSource::Local => self.analyze_local(&fruit, image).await,
            AnalysisSource::External => self.analyze_external(&fruit, image).await,
        };
        let elapsed = start.elapsed();

        match &result {
            Ok(analysis) => {
                info!(
                    fruit = %fruit,
                    source = %source,
                    ripeness = %analysis.ripeness_level,
                    confidence = ?analysis.confidence,
                    duration_ms = elapsed.as_millis() as u64,
                    "Analysis complete"
                );
                metrics::record_analysis(
                    &fruit,
                    source.as_str(),
                    &analysis.ripeness_level,
                    elapsed.as_secs_f64(),
                );
            }
            Err(e) => {
                warn!(fruit = %fruit, source = %source, error = %e, "Analysis failed");
                metrics::record_analysis_failure(source.as_str(), e.code());
            }
        }

        result
    }

    async fn analyze_local(&self, fruit: &str, image: Bytes) -> ApiResult<AnalysisResult> {
        let analyzer = self
            .registry
            .get(fruit)
            .ok_or_else(|| ApiError::UnsupportedFruit {
                fruit: fruit.to_string(),
                supported: self.registry.fruits(),
            })?;

        // Decoding and sampling are CPU bound
        let label = tokio::task::spawn_blocking(move || analyzer.analyze(&image))
            .await
            .map_err(|e| ApiError::internal(format!("Analysis task failed: {}", e)))??;

        Ok(AnalysisResult::local(fruit, label))
    }

    async fn analyze_external(&self, fruit: &str, image: Bytes) -> ApiResult<AnalysisResult> {
        let classification = self.external.classify(&image, fruit).await?;
        Ok(AnalysisResult::external(
            fruit,
            classification.label,
            classification.confidence,
        ))
    }
}
