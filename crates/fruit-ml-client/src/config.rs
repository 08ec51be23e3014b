//! Roboflow client configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::warn;

const DEFAULT_API_URL: &str = "https://detect.roboflow.com";
const DEFAULT_MODELS: &str = "banana=banana-ripeness-classification/5";

/// Configuration for the Roboflow client.
#[derive(Clone)]
pub struct RoboflowConfig {
    /// Base URL of the hosted inference API
    pub api_url: String,
    /// API key; `None` disables external classification
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further attempt
    pub retry_backoff: Duration,
    /// Fruit type → model ID (`project/version`)
    pub models: BTreeMap<String, String>,
}

// Hand-written so the API key never lands in logs.
impl std::fmt::Debug for RoboflowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoboflowConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("models", &self.models)
            .finish()
    }
}

impl Default for RoboflowConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
            models: parse_model_table(DEFAULT_MODELS),
        }
    }
}

impl RoboflowConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("ROBOFLOW_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key: std::env::var("ROBOFLOW_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            timeout: Duration::from_secs(
                std::env::var("ROBOFLOW_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_retries: std::env::var("ROBOFLOW_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            retry_backoff: Duration::from_millis(500),
            models: parse_model_table(
                &std::env::var("ROBOFLOW_MODELS").unwrap_or_else(|_| DEFAULT_MODELS.to_string()),
            ),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Returns true if requests can be sent.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Parse `fruit=project/version` pairs separated by commas.
///
/// Fruit names are lowercased. Malformed entries are skipped with a warning.
pub fn parse_model_table(raw: &str) -> BTreeMap<String, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.split_once('=') {
            Some((fruit, model)) if !fruit.trim().is_empty() && !model.trim().is_empty() => {
                Some((fruit.trim().to_lowercase(), model.trim().to_string()))
            }
            _ => {
                warn!(entry = %entry, "Ignoring malformed ROBOFLOW_MODELS entry");
                None
            }
        })
        .collect()
}
