//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "fruit_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "fruit_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "fruit_http_requests_in_flight";

    // Analysis metrics
    pub const ANALYSES_TOTAL: &str = "fruit_analyses_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "fruit_analysis_duration_seconds";
    pub const ANALYSIS_FAILURES_TOTAL: &str = "fruit_analysis_failures_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "fruit_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a completed analysis.
pub fn record_analysis(fruit: &str, source: &str, label: &str, duration_secs: f64) {
    let labels = [
        ("fruit", fruit.to_string()),
        ("source", source.to_string()),
        ("label", label.to_string()),
    ];
    counter!(names::ANALYSES_TOTAL, &labels).increment(1);

    let timing = [("fruit", fruit.to_string()), ("source", source.to_string())];
    histogram!(names::ANALYSIS_DURATION_SECONDS, &timing).record(duration_secs);
}

/// Record a failed analysis, keyed by error code.
pub fn record_analysis_failure(source: &str, kind: &str) {
    let labels = [("source", source.to_string()), ("kind", kind.to_string())];
    counter!(names::ANALYSIS_FAILURES_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Route template for labels, so unknown paths don't explode cardinality.
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = route_label(&request);
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
