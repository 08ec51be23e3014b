//! Roboflow hosted inference HTTP client.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::config::RoboflowConfig;
use crate::error::{MlError, MlResult};
use crate::types::{Classification, RoboflowResponse};

/// Client for Roboflow classification models.
pub struct RoboflowClient {
    http: Client,
    config: RoboflowConfig,
}

impl RoboflowClient {
    /// Create a new client.
    pub fn new(config: RoboflowConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Returns true if an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Fruit types with a registered model, sorted.
    pub fn supported_fruits(&self) -> Vec<String> {
        self.config.models.keys().cloned().collect()
    }

    /// Model ID for a fruit type.
    pub fn model_for(&self, fruit_type: &str) -> MlResult<&str> {
        self.config
            .models
            .get(&fruit_type.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| MlError::UnsupportedFruitType {
                fruit: fruit_type.to_string(),
                supported: self.supported_fruits(),
            })
    }

    /// Classify an encoded image with the model registered for `fruit_type`.
    pub async fn classify(&self, image: &[u8], fruit_type: &str) -> MlResult<Classification> {
        let model_id = self.model_for(fruit_type)?;
        let api_key = self.config.api_key.as_deref().ok_or(MlError::NotConfigured)?;
        let url = format!("{}/{}", self.config.api_url.trim_end_matches('/'), model_id);
        let url = url.as_str();

        debug!(model_id = %model_id, bytes = image.len(), "Sending classification request");

        let response = self
            .with_retry(move || async move {
                let part = Part::bytes(image.to_vec()).file_name("image.jpg");
                let form = Form::new().part("file", part);
                let response = self
                    .http
                    .post(url)
                    .query(&[("api_key", api_key)])
                    .multipart(form)
                    .send()
                    .await
                    .map_err(|e| self.map_send_error(e))?;
                check_status(response).await
            })
            .await?;

        let raw = response
            .bytes()
            .await
            .map_err(|e| MlError::Network(e.without_url()))?;
        let body: RoboflowResponse = serde_json::from_slice(&raw)?;
        let classification = select_prediction(body)?;

        debug!(
            model_id = %model_id,
            label = %classification.label,
            confidence = classification.confidence,
            "Classification received"
        );

        Ok(classification)
    }

    fn map_send_error(&self, error: reqwest::Error) -> MlError {
        if error.is_timeout() {
            MlError::Timeout(self.config.timeout.as_secs())
        } else {
            // Never echo the URL, it carries the API key.
            MlError::Network(error.without_url())
        }
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_backoff * 2u32.pow(attempt);
                    warn!(
                        "Classification request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(MlError::RequestFailed("Unknown error".to_string())))
    }
}

async fn check_status(response: Response) -> MlResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("Roboflow returned {}: {}", status, body);
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Err(MlError::ServiceUnavailable(message))
    } else {
        Err(MlError::RequestFailed(message))
    }
}

/// Pick the highest-confidence prediction, falling back to `top`.
fn select_prediction(response: RoboflowResponse) -> MlResult<Classification> {
    let best = response
        .predictions
        .into_iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        .map(|p| (p.class, p.confidence))
        .or_else(|| response.top.zip(response.confidence));

    let (label, confidence) = best.ok_or_else(|| {
        MlError::InvalidResponse("response contained no predictions".to_string())
    })?;

    if !(0.0..=1.0).contains(&confidence) {
        return Err(MlError::InvalidResponse(format!(
            "confidence {} outside [0, 1]",
            confidence
        )));
    }

    Ok(Classification { label, confidence })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Prediction;

    fn prediction(class: &str, confidence: f64) -> Prediction {
        Prediction {
            class: class.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_select_highest_confidence() {
        let response = RoboflowResponse {
            predictions: vec![
                prediction("unripe", 0.2),
                prediction("ripe", 0.7),
                prediction("overripe", 0.1),
            ],
            ..Default::default()
        };
        let best = select_prediction(response).unwrap();
        assert_eq!(best.label, "ripe");
        assert_eq!(best.confidence, 0.7);
    }

    #[test]
    fn test_select_falls_back_to_top() {
        let response = RoboflowResponse {
            predictions: vec![],
            top: Some("overripe".to_string()),
            confidence: Some(0.88),
        };
        assert_eq!(select_prediction(response).unwrap().label, "overripe");
    }

    #[test]
    fn test_select_empty_is_invalid() {
        let err = select_prediction(RoboflowResponse::default()).unwrap_err();
        assert!(matches!(err, MlError::InvalidResponse(_)));
    }

    #[test]
    fn test_select_rejects_out_of_range_confidence() {
        let response = RoboflowResponse {
            predictions: vec![prediction("ripe", 1.5)],
            ..Default::default()
        };
        assert!(matches!(select_prediction(response), Err(MlError::InvalidResponse(_))));
    }

    #[test]
    fn test_model_lookup() {
        let client = RoboflowClient::new(RoboflowConfig::default()).unwrap();
        assert_eq!(client.model_for("Banana").unwrap(), "banana-ripeness-classification/5");
        match client.model_for("kiwi") {
            Err(MlError::UnsupportedFruitType { fruit, supported }) => {
                assert_eq!(fruit, "kiwi");
                assert_eq!(supported, vec!["banana".to_string()]);
            }
            other => panic!("unexpected: {:?}", other.map(str::to_string)),
        }
    }
}
