//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

use fruit_ml_client::RoboflowConfig;
use fruit_models::AnalysisSource;
use fruit_vision::ClassificationPolicy;
use tracing::warn;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, colored when writing to a terminal
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `fruit_api=debug,info`
    pub level: String,
    pub format: LogFormat,
    /// Append logs to this file instead of stdout
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            output_path: None,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: std::env::var("LOG_FORMAT")
                .map(|v| {
                    if v.eq_ignore_ascii_case("json") {
                        LogFormat::Json
                    } else {
                        LogFormat::Text
                    }
                })
                .unwrap_or_default(),
            output_path: std::env::var("LOG_OUTPUT_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second, per client IP
    pub rate_limit_rps: u32,
    /// Rate limit burst
    pub rate_limit_burst: u32,
    /// Request timeout
    pub request_timeout: Duration,
    /// Grace period for in-flight requests after a shutdown signal
    pub shutdown_timeout: Duration,
    /// Max request body size (uploads included)
    pub max_body_size: usize,
    /// Deployment label, reported at startup
    pub environment: String,
    /// Serve Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    /// Source used when a request does not name one
    pub default_source: AnalysisSource,
    /// Rule set for the banana analyzer
    pub banana_policy: ClassificationPolicy,
    pub log: LogConfig,
    pub roboflow: RoboflowConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            rate_limit_burst: 20,
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(15),
            max_body_size: 10 * 1024 * 1024, // 10MB
            environment: "development".to_string(),
            metrics_enabled: true,
            default_source: AnalysisSource::Local,
            banana_policy: ClassificationPolicy::default(),
            log: LogConfig::default(),
            roboflow: RoboflowConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            shutdown_timeout: Duration::from_secs(
                std::env::var("SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            default_source: parse_or_default("DEFAULT_ANALYSIS_SOURCE"),
            banana_policy: parse_or_default("BANANA_POLICY"),
            log: LogConfig::from_env(),
            roboflow: RoboflowConfig::from_env(),
        }
    }
}

/// Parse an env var, warning and falling back to the default on bad input.
fn parse_or_default<T>(key: &str) -> T
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "Invalid value, using default");
            T::default()
        }),
        Err(_) => T::default(),
    }
}
