//! HTTP transport to the prediction service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{ChurnError, Result};

/// Status and raw body of a settled HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Anything that can carry a JSON POST to the prediction service.
///
/// An `Err` means no response was obtained at all; any HTTP status, including
/// failures, is an `Ok`.
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    async fn post_json(&self, path: &str, body: Vec<u8>) -> Result<RawResponse>;
}

/// Body of `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// reqwest-backed transport bound to a base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport. `timeout` of `None` waits indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = base_url.into();
        let client = builder
            .build()
            .map_err(|err| ChurnError::http(base_url.clone(), err))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the base URL and a path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Query the service health endpoint
    #[instrument(skip(self))]
    pub async fn health(&self, path: &str) -> Result<HealthStatus> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ChurnError::http(url.clone(), err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChurnError::status(url, status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| ChurnError::http(url.clone(), err))?;
        serde_json::from_slice(&bytes).map_err(|err| ChurnError::json(url, err))
    }
}

#[async_trait]
impl PredictionTransport for HttpTransport {
    #[instrument(skip(self, body))]
    async fn post_json(&self, path: &str, body: Vec<u8>) -> Result<RawResponse> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| ChurnError::http(url.clone(), err))?;

        let status = response.status().as_u16();
        // an unreadable body is handled like an unparsable one
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                warn!(%url, error = %err, "failed to read response body");
                Vec::new()
            }
        };
        debug!(%url, status, len = body.len(), "prediction response received");

        Ok(RawResponse { status, body })
    }
}
