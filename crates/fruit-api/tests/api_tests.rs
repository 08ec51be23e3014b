//! API integration tests.

use std::io::{self, Cursor};
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use fruit_api::{create_router, ApiConfig, AppState};
use fruit_ml_client::RoboflowConfig;
use image::{ImageOutputFormat, Rgb, RgbImage};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing::Level;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "fruit-test-boundary";

fn test_router(config: ApiConfig) -> Router {
    let state = AppState::new(config).unwrap();
    create_router(state, None)
}

fn png(color: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(8, 8, Rgb(color));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
    buf.into_inner()
}

/// Build a multipart body with one file part.
fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"fruit.png\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn analyze_request(query: &str, field: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/analyze{query}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, data)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("x-request-id", "trace-abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-abc-123");
}

#[tokio::test]
async fn test_ready_reports_external_disabled() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["analyzers"]["status"], "ok");
    assert_eq!(body["checks"]["external"]["status"], "disabled");
}

#[tokio::test]
async fn test_fruits_listing() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/fruits").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["local"], json!(["banana"]));
    assert_eq!(body["external"], json!(["banana"]));
    assert_eq!(body["external_enabled"], false);
    assert_eq!(body["default_source"], "local");
    assert_eq!(body["labels"], json!(["green", "ripe", "overripe", "unknown"]));
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_request_id_is_logged_on_request_span() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = test_router(ApiConfig::default());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/fruits")
                .header("x-request-id", "trace-abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let output = logs.contents();
    let line = output
        .lines()
        .find(|l| l.contains("Request completed"))
        .expect("completion line logged");
    assert!(line.contains("request_id"), "{line}");
    assert!(line.contains("trace-abc-123"), "{line}");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = create_router(AppState::new(ApiConfig::default()).unwrap(), Some(handle));

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_disabled_is_not_found() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_local_green_banana() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(analyze_request("?type=banana", "image", &png([0, 255, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["fruit_type"], "banana");
    assert_eq!(body["ripeness_level"], "green");
    assert_eq!(body["source"], "local");
    assert!(body.get("confidence").is_none());
}

#[tokio::test]
async fn test_analyze_local_ripe_banana() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(analyze_request("?type=Banana&source=local", "image", &png([230, 200, 40])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ripeness_level"], "ripe");
}

#[tokio::test]
async fn test_analyze_missing_type() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(analyze_request("", "image", &png([0, 255, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn test_analyze_missing_image_field() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(analyze_request("?type=banana", "photo", &png([0, 255, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_empty_image() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(analyze_request("?type=banana", "image", b""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_not_multipart() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze?type=banana")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_oversized_upload_is_413() {
    let config = ApiConfig {
        max_body_size: 4096,
        ..ApiConfig::default()
    };
    let app = test_router(config);

    // No Content-Length, so the limit trips while the multipart stream is read
    let response = app
        .oneshot(analyze_request("?type=banana", "image", &vec![0u8; 64 * 1024]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["code"], "payload_too_large");
}

#[tokio::test]
async fn test_analyze_corrupt_image() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(analyze_request("?type=banana", "image", b"definitely not a picture"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["code"], "decode_error");
}

#[tokio::test]
async fn test_analyze_unsupported_fruit() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(analyze_request("?type=durian", "image", &png([0, 255, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "unsupported_fruit");
    assert!(body["detail"].as_str().unwrap().contains("banana"));
}

#[tokio::test]
async fn test_analyze_unknown_source() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(analyze_request("?type=banana&source=cloud", "image", &png([0, 255, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_wrong_method() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/analyze?type=banana").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_analyze_external_without_key() {
    let app = test_router(ApiConfig::default());

    let response = app
        .oneshot(analyze_request("?type=banana&source=external", "image", &png([0, 255, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["code"], "external_unavailable");
}

fn external_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        roboflow: RoboflowConfig {
            api_url: server.uri(),
            max_retries: 0,
            ..RoboflowConfig::default()
        }
        .with_api_key("test-key"),
        ..ApiConfig::default()
    }
}

#[tokio::test]
async fn test_analyze_external_classification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/banana-ripeness-classification/5"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [
                { "class": "ripe", "confidence": 0.91 },
                { "class": "overripe", "confidence": 0.07 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_router(external_config(&server));

    let response = app
        .oneshot(analyze_request("?type=banana&source=external", "image", &png([0, 255, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["fruit_type"], "banana");
    assert_eq!(body["ripeness_level"], "ripe");
    assert_eq!(body["confidence"], 0.91);
    assert_eq!(body["source"], "external");
}

#[tokio::test]
async fn test_analyze_external_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad model"))
        .mount(&server)
        .await;

    let app = test_router(external_config(&server));

    let response = app
        .oneshot(analyze_request("?type=banana&source=external", "image", &png([0, 255, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["code"], "upstream_error");
}

#[tokio::test]
async fn test_rate_limiting() {
    let config = ApiConfig {
        rate_limit_rps: 1,
        rate_limit_burst: 2,
        ..ApiConfig::default()
    };
    let app = test_router(config);

    let send = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(send("192.168.1.100")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let limited = app.clone().oneshot(send("192.168.1.100")).await.unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));

    // Other clients keep their own budget
    let other = app.oneshot(send("192.168.1.101")).await.unwrap();
    assert_eq!(other.status(), StatusCode::BAD_REQUEST);
}
