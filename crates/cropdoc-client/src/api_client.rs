// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async client for the crop-disease prediction service.
//
// Endpoints:
//   - POST /predict          multipart `file` → diagnosis JSON
//   - GET  /health           liveness probe (diagnostics only)
//   - GET  /diseases         catalogue of supported diseases
//   - GET  /disease/{name}   details for one disease

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use tracing::{debug, error, info, instrument, warn};

use cropdoc_core::AppConfig;
use cropdoc_core::error::{CropdocError, Result};
use cropdoc_core::human_errors::TIMEOUT_MESSAGE;
use cropdoc_core::types::{FailureKind, PredictionOutcome, PreparedImage, Prediction};

/// Multipart field name the service reads the image from.
pub const FILE_FIELD: &str = "file";

const PREDICTION_FAILED: &str = "Prediction failed";
const INVALID_FILE: &str = "Please upload a valid image file";
const FILE_TOO_LARGE: &str = "Image file is too large. Maximum size is 10MB.";

/// Client bound to one prediction service base URL.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    base_url: String,
    http: reqwest::Client,
    predict_timeout: Duration,
    health_timeout: Duration,
    max_upload_bytes: u64,
}

impl PredictionClient {
    /// Create a client from the application config.
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_builder(config, reqwest::Client::builder())
    }

    /// Create a client from a customised `reqwest` builder.
    pub fn with_builder(config: &AppConfig, builder: reqwest::ClientBuilder) -> Result<Self> {
        let http = builder
            .build()
            .map_err(|e| CropdocError::Network(format!("failed to build HTTP client: {e}")))?;
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        info!(base_url = %base_url, "prediction client ready");
        Ok(Self {
            base_url,
            http,
            predict_timeout: config.predict_timeout(),
            health_timeout: config.health_timeout(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// Override both deadlines.
    pub fn with_timeouts(mut self, predict: Duration, health: Duration) -> Self {
        self.predict_timeout = predict;
        self.health_timeout = health;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload an image and return the diagnosis.
    ///
    /// Never fails past this boundary: invalid input, timeouts, connection
    /// errors, error statuses, and unreadable bodies all become
    /// [`PredictionOutcome::Failure`].
    #[instrument(skip_all, fields(name = %image.name, size = image.size()))]
    pub async fn predict(&self, image: &PreparedImage) -> PredictionOutcome {
        // Upstream validation may not have run; check again.
        if !image.mime_type.starts_with("image/") {
            return PredictionOutcome::failure(FailureKind::InvalidInput, INVALID_FILE);
        }
        if image.size() > self.max_upload_bytes {
            return PredictionOutcome::failure(FailureKind::InvalidInput, FILE_TOO_LARGE);
        }

        let part = match Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.mime_type)
        {
            Ok(part) => part,
            Err(e) => {
                warn!(mime = %image.mime_type, error = %e, "unusable MIME type");
                return PredictionOutcome::failure(FailureKind::InvalidInput, INVALID_FILE);
            }
        };
        // No explicit Content-Type: reqwest adds it with the boundary.
        let form = Form::new().part(FILE_FIELD, part);

        let url = self.endpoint("predict");
        info!(url = %url, "sending prediction request");

        let exchange = async {
            let response = self.http.post(&url).multipart(form).send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body.to_vec()))
        };

        // Dropping `exchange` on expiry aborts the in-flight request.
        match tokio::time::timeout(self.predict_timeout, exchange).await {
            Err(_) => {
                warn!(
                    timeout_s = self.predict_timeout.as_secs_f32(),
                    "prediction request timed out"
                );
                PredictionOutcome::failure(FailureKind::Timeout, TIMEOUT_MESSAGE)
            }
            Ok(Err(e)) => {
                error!(error = %e, "prediction request failed");
                network_failure(&e)
            }
            Ok(Ok((status, body))) => interpret_prediction(status, &body),
        }
    }

    /// Probe `GET /health`; 10 s deadline by default.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<serde_json::Value> {
        let url = self.endpoint("health");
        let (status, body) = self.get(&url, self.health_timeout).await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "health check failed");
            return Err(CropdocError::Server("API health check failed".into()));
        }
        parse_json(&body)
    }

    /// `GET /diseases`: the service's catalogue, passed through as JSON.
    #[instrument(skip(self))]
    pub async fn supported_diseases(&self) -> Result<serde_json::Value> {
        let url = self.endpoint("diseases");
        let (status, body) = self.get(&url, self.predict_timeout).await?;
        if !status.is_success() {
            return Err(CropdocError::Server(
                "Failed to fetch supported diseases".into(),
            ));
        }
        parse_json(&body)
    }

    /// `GET /disease/{name}` with the name percent-encoded as one path segment.
    #[instrument(skip(self))]
    pub async fn disease_info(&self, name: &str) -> Result<serde_json::Value> {
        let mut url = reqwest::Url::parse(&self.endpoint("disease"))
            .map_err(|e| CropdocError::Network(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| CropdocError::Network("base URL cannot take a path".into()))?
            .push(name);

        let (status, body) = self.get(url.as_str(), self.predict_timeout).await?;
        if !status.is_success() {
            let detail = detail_message(&body).unwrap_or_else(|| "Disease not found".into());
            return Err(CropdocError::Server(detail));
        }
        parse_json(&body)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get(&self, url: &str, deadline: Duration) -> Result<(StatusCode, Vec<u8>)> {
        debug!(url, "GET");
        let exchange = async {
            let response = self.http.get(url).send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body.to_vec()))
        };
        tokio::time::timeout(deadline, exchange)
            .await
            .map_err(|_| CropdocError::Timeout(deadline.as_secs()))?
            .map_err(|e| CropdocError::Network(e.to_string()))
    }
}

/// Turn a completed HTTP exchange into an outcome.
fn interpret_prediction(status: StatusCode, body: &[u8]) -> PredictionOutcome {
    if !status.is_success() {
        let message = detail_message(body).unwrap_or_else(|| PREDICTION_FAILED.into());
        warn!(status = status.as_u16(), message = %message, "prediction rejected");
        return PredictionOutcome::failure(FailureKind::Server, message);
    }

    match serde_json::from_slice::<Prediction>(body) {
        Ok(prediction) => {
            info!(
                disease = %prediction.disease,
                confidence = prediction.confidence,
                "prediction received"
            );
            PredictionOutcome::Success(prediction)
        }
        Err(e) => {
            error!(error = %e, "unreadable prediction body");
            PredictionOutcome::failure(
                FailureKind::MalformedResponse,
                "Invalid response from prediction service",
            )
        }
    }
}

fn network_failure(err: &reqwest::Error) -> PredictionOutcome {
    if err.is_timeout() {
        PredictionOutcome::failure(FailureKind::Timeout, TIMEOUT_MESSAGE)
    } else if err.is_connect() {
        PredictionOutcome::failure(
            FailureKind::Network,
            "Network error during prediction: could not reach the prediction service",
        )
    } else {
        PredictionOutcome::failure(
            FailureKind::Network,
            format!("Network error during prediction: {err}"),
        )
    }
}

/// The `detail` string of an error body, if there is one.
fn detail_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(str::to_string)
        .filter(|d| !d.is_empty())
}

/// Pull display names out of a `/diseases` body.
///
/// Accepts a bare array, an object wrapping one under `diseases`, or an
/// object keyed by disease name.
pub fn disease_names(catalogue: &serde_json::Value) -> Vec<String> {
    match catalogue {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                serde_json::Value::String(name) => Some(name.clone()),
                other => other.get("name").and_then(|n| n.as_str()).map(str::to_string),
            })
            .collect(),
        serde_json::Value::Object(map) => match map.get("diseases") {
            Some(inner) => disease_names(inner),
            None => map.keys().cloned().collect(),
        },
        _ => Vec::new(),
    }
}

/// One readable paragraph from a `/disease/{name}` body.
///
/// Prefers a `description` or `summary` string and falls back to the
/// pretty-printed body.
pub fn disease_summary(info: &serde_json::Value) -> String {
    ["description", "summary"]
        .iter()
        .filter_map(|key| info.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| serde_json::to_string_pretty(info).unwrap_or_else(|_| info.to_string()))
}

fn parse_json(body: &[u8]) -> Result<serde_json::Value> {
    serde_json::from_slice(body).map_err(|e| CropdocError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{CannedResponse, TestServer, refused_url};
    use cropdoc_core::types::{PredictionFailure, UploadCandidate};

    const DIAGNOSIS: &str = r#"{
        "disease": "Early Blight",
        "confidence": 0.941,
        "severity": "Medium",
        "treatment": ["Remove affected leaves", "Apply copper fungicide"],
        "prevention": ["Rotate crops"],
        "description": "Dark concentric spots",
        "affected_area": "leaves"
    }"#;

    fn client_for(base_url: &str) -> PredictionClient {
        let config = AppConfig::default().with_api_url(Some(base_url.to_string()));
        PredictionClient::with_builder(&config, reqwest::Client::builder().no_proxy()).unwrap()
    }

    fn jpeg(size: usize) -> PreparedImage {
        PreparedImage::passthrough(UploadCandidate::new("leaf.jpg", "image/jpeg", vec![7u8; size]))
    }

    fn failure(outcome: PredictionOutcome) -> PredictionFailure {
        match outcome {
            PredictionOutcome::Failure(f) => f,
            PredictionOutcome::Success(p) => panic!("expected failure, got {p:?}"),
        }
    }

    #[tokio::test]
    async fn success_body_becomes_prediction() {
        let server = TestServer::start(CannedResponse::json(200, DIAGNOSIS)).await;
        let outcome = client_for(&server.base_url).predict(&jpeg(64)).await;

        match outcome {
            PredictionOutcome::Success(p) => {
                assert_eq!(p.disease, "Early Blight");
                assert_eq!(p.treatment.len(), 2);
                assert_eq!(p.affected_area.as_deref(), Some("leaves"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_is_multipart_with_file_field() {
        let server = TestServer::start(CannedResponse::json(200, DIAGNOSIS)).await;
        client_for(&server.base_url).predict(&jpeg(16)).await;

        let request = server.last_request().await.expect("request recorded");
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/predict");
        let content_type = request.header("content-type").unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains(r#"name="file"; filename="leaf.jpg""#));
        assert!(body.contains("Content-Type: image/jpeg"));
    }

    #[tokio::test]
    async fn error_status_surfaces_detail() {
        let server =
            TestServer::start(CannedResponse::json(422, r#"{"detail":"Image too blurry"}"#)).await;
        let f = failure(client_for(&server.base_url).predict(&jpeg(16)).await);
        assert_eq!(f.kind, FailureKind::Server);
        assert_eq!(f.message, "Image too blurry");
    }

    #[tokio::test]
    async fn error_status_without_detail_is_generic() {
        let server = TestServer::start(CannedResponse::json(500, "Internal Server Error")).await;
        let f = failure(client_for(&server.base_url).predict(&jpeg(16)).await);
        assert_eq!(f.kind, FailureKind::Server);
        assert_eq!(f.message, PREDICTION_FAILED);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_failure() {
        let server = TestServer::start(CannedResponse::json(200, "<html>hi</html>")).await;
        let f = failure(client_for(&server.base_url).predict(&jpeg(16)).await);
        assert_eq!(f.kind, FailureKind::MalformedResponse);
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = TestServer::start(
            CannedResponse::json(200, DIAGNOSIS).delayed(Duration::from_secs(5)),
        )
        .await;
        let client = client_for(&server.base_url)
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));

        let f = failure(client.predict(&jpeg(16)).await);
        assert_eq!(f.kind, FailureKind::Timeout);
        assert!(f.message.contains("timed out"));
    }

    #[tokio::test]
    async fn unreachable_service_is_network_failure() {
        let url = refused_url().await;
        let f = failure(client_for(&url).predict(&jpeg(16)).await);
        assert_eq!(f.kind, FailureKind::Network);
    }

    #[tokio::test]
    async fn non_image_is_refused_before_sending() {
        let server = TestServer::start(CannedResponse::json(200, DIAGNOSIS)).await;
        let doc = PreparedImage::passthrough(UploadCandidate::new("a.pdf", "application/pdf", vec![1]));
        let f = failure(client_for(&server.base_url).predict(&doc).await);
        assert_eq!(f.kind, FailureKind::InvalidInput);
        assert!(server.last_request().await.is_none());
    }

    #[tokio::test]
    async fn oversized_image_is_refused_before_sending() {
        let server = TestServer::start(CannedResponse::json(200, DIAGNOSIS)).await;
        let f = failure(client_for(&server.base_url).predict(&jpeg(10 * 1024 * 1024 + 1)).await);
        assert_eq!(f.kind, FailureKind::InvalidInput);
        assert_eq!(f.message, FILE_TOO_LARGE);
    }

    #[tokio::test]
    async fn health_check_returns_body() {
        let server = TestServer::start(CannedResponse::json(200, r#"{"status":"ok"}"#)).await;
        let body = client_for(&server.base_url).health_check().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(server.last_request().await.unwrap().path, "/health");
    }

    #[tokio::test]
    async fn health_check_times_out() {
        let server = TestServer::start(
            CannedResponse::json(200, "{}").delayed(Duration::from_secs(5)),
        )
        .await;
        let client = client_for(&server.base_url)
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        assert!(matches!(client.health_check().await, Err(CropdocError::Timeout(_))));
    }

    #[tokio::test]
    async fn disease_name_is_path_encoded() {
        let server = TestServer::start(CannedResponse::json(200, r#"{"name":"x"}"#)).await;
        client_for(&server.base_url)
            .disease_info("Maize Streak/Virus")
            .await
            .unwrap();
        let request = server.last_request().await.unwrap();
        assert_eq!(request.path, "/disease/Maize%20Streak%2FVirus");
    }

    #[tokio::test]
    async fn unknown_disease_uses_detail() {
        let server =
            TestServer::start(CannedResponse::json(404, r#"{"detail":"No such disease"}"#)).await;
        let err = client_for(&server.base_url).disease_info("Foo").await.unwrap_err();
        assert!(matches!(err, CropdocError::Server(ref m) if m == "No such disease"));
    }

    #[tokio::test]
    async fn disease_catalogue_failure_message() {
        let server = TestServer::start(CannedResponse::json(503, "{}")).await;
        let err = client_for(&server.base_url).supported_diseases().await.unwrap_err();
        assert!(matches!(err, CropdocError::Server(ref m) if m == "Failed to fetch supported diseases"));
    }

    #[test]
    fn catalogue_shapes_are_flattened() {
        let wrapped = serde_json::json!({"diseases": ["Early Blight", {"name": "Leaf Mold"}]});
        assert_eq!(disease_names(&wrapped), vec!["Early Blight", "Leaf Mold"]);

        let keyed = serde_json::json!({"Healthy": {}, "Septoria": {}});
        assert_eq!(disease_names(&keyed).len(), 2);
        assert!(disease_names(&serde_json::json!(42)).is_empty());
    }

    #[test]
    fn disease_summary_prefers_description() {
        let info = serde_json::json!({"name": "Leaf Mold", "description": " Yellow patches ", "summary": "x"});
        assert_eq!(disease_summary(&info), "Yellow patches");

        let info = serde_json::json!({"description": "", "summary": "Fungal"});
        assert_eq!(disease_summary(&info), "Fungal");

        let bare = serde_json::json!({"name": "Leaf Mold"});
        assert!(disease_summary(&bare).contains("\"name\": \"Leaf Mold\""));
    }

    #[tokio::test]
    async fn disease_info_feeds_summary() {
        let server = TestServer::start(CannedResponse::json(
            200,
            r#"{"name":"Early Blight","description":"Concentric rings on older leaves"}"#,
        ))
        .await;
        let info = client_for(&server.base_url).disease_info("Early Blight").await.unwrap();
        assert_eq!(disease_summary(&info), "Concentric rings on older leaves");
    }

    #[test]
    fn default_deadlines() {
        let client = PredictionClient::new(&AppConfig::default()).unwrap();
        assert_eq!(client.predict_timeout, Duration::from_secs(30));
        assert_eq!(client.health_timeout, Duration::from_secs(10));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = client_for("http://localhost:8000/");
        assert_eq!(client.endpoint("predict"), "http://localhost:8000/predict");
    }
}
