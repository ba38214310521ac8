//! HTTP client for the remote object-detection service
//!
//! The snapshot is posted as a multipart form with a single `file` field and
//! the API key as a query parameter. A successful response looks like
//! `{"predictions": [{"x", "y", "width", "height", "class", "confidence"}, ...]}`
//! with coordinates in model input space.

use log::{debug, error, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;

use super::Detection;

pub const SNAPSHOT_FILE_NAME: &str = "snapshot.png";

#[derive(Debug, Clone, thiserror::Error)]
pub enum DetectionError {
    #[error("Failed to reach detection service: {0}")]
    Request(String),
    #[error("Detection service error: {0}")]
    Status(String),
    #[error("Malformed detection response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(rename = "class")]
    label: String,
    confidence: f32,
}

impl From<Prediction> for Detection {
    fn from(p: Prediction) -> Self {
        Detection {
            center_x: p.x,
            center_y: p.y,
            width: p.width,
            height: p.height,
            label: p.label,
            confidence: p.confidence,
        }
    }
}

/// Turn a raw HTTP status + body into detections.
///
/// Any non-2xx status is an error carrying the status reason. A 2xx body
/// without a `predictions` array is treated as zero detections.
pub fn parse_response(status: StatusCode, body: &str) -> Result<Vec<Detection>, DetectionError> {
    if !status.is_success() {
        return Err(DetectionError::Status(status.to_string()));
    }

    let response: PredictionResponse = serde_json::from_str(body)
        .map_err(|e| DetectionError::MalformedResponse(e.to_string()))?;

    Ok(response.predictions.into_iter().map(Detection::from).collect())
}

#[derive(Debug, Clone)]
pub struct DetectionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl DetectionClient {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, DetectionError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| DetectionError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http_client(http_client, endpoint, api_key))
    }

    pub fn with_http_client(http_client: reqwest::Client, endpoint: &str, api_key: &str) -> Self {
        if api_key.is_empty() {
            warn!("No API key configured for the detection service");
        }

        Self {
            http_client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a PNG snapshot and wait for the detection set.
    /// No timeout and no retry: a hung request keeps the caller waiting.
    pub async fn detect(&self, png_bytes: Vec<u8>) -> Result<Vec<Detection>, DetectionError> {
        info!("Sending {} byte snapshot to {}", png_bytes.len(), self.endpoint);

        let part = Part::bytes(png_bytes)
            .file_name(SNAPSHOT_FILE_NAME)
            .mime_str("image/png")
            .map_err(|e| DetectionError::Request(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("api_key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Detection request failed: {}", e);
                DetectionError::Request(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DetectionError::MalformedResponse(e.to_string()))?;

        if !status.is_success() {
            warn!("Detection service returned {}: {}", status, body);
        } else {
            debug!("Detection response body: {}", body);
        }

        let detections = parse_response(status, &body)?;
        info!("Detection service returned {} prediction(s)", detections.len());
        Ok(detections)
    }
}
