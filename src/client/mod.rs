//! Metrics service client.
//!
//! One typed fetch per call: [`MetricsClient::fetch`] issues a single GET for an
//! endpoint and model version, validates the body and returns either a typed
//! [`RawPayload`] or a [`FetchError`]. There are no retries at this layer; the
//! polling loop's next tick is the retry.

mod error;
mod parser;
mod types;

pub use error::*;
pub use parser::{parse_drift_response, parse_metrics_response, parse_timestamp};
pub use types::*;

use crate::config::ServiceConfig;
use async_trait::async_trait;
use reqwest::Url;
use std::time::{Duration, Instant};

/// Anything that can serve the two metrics feeds.
///
/// The polling controller is generic over this so tests can drive it with
/// scripted responses.
#[async_trait]
pub trait MetricsSource: Send + Sync + 'static {
    async fn fetch(
        &self,
        kind: EndpointKind,
        model_version: &str,
    ) -> Result<RawPayload, FetchError>;
}

/// HTTP client for the metrics service.
#[derive(Debug, Clone)]
pub struct MetricsClient {
    /// Service root, e.g. `http://localhost:8000/`
    base_url: Url,
    /// Shared HTTP client with connection pooling
    client: reqwest::Client,
    /// Per-request deadline; `None` lets a hung request wait indefinitely
    timeout: Option<Duration>,
}

impl MetricsClient {
    /// Create a client with its own connection pool.
    pub fn new(config: &ServiceConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::InvalidRequest(format!("HTTP client: {}", e)))?;
        Self::with_client(config, client)
    }

    /// Create a client around an existing HTTP client (for testing and sharing).
    pub fn with_client(config: &ServiceConfig, client: reqwest::Client) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            FetchError::InvalidRequest(format!("base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidRequest(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self {
            base_url,
            client,
            timeout: config.timeout_seconds.map(Duration::from_secs),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Underlying HTTP client, shared with the upload flow.
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Build a URL under the service root from path segments.
    ///
    /// Segments are percent-encoded, so an opaque model version like `a/b`
    /// stays a single segment.
    pub fn url_for<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidRequest("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL for one feed and model version.
    pub fn endpoint_url(&self, kind: EndpointKind, model_version: &str) -> Result<Url, FetchError> {
        let segments = kind
            .path_prefix()
            .split('/')
            .chain(std::iter::once(model_version));
        self.url_for(segments)
    }

    /// Fetch and validate one feed.
    pub async fn fetch(
        &self,
        kind: EndpointKind,
        model_version: &str,
    ) -> Result<RawPayload, FetchError> {
        if model_version.is_empty() {
            return Err(FetchError::InvalidRequest(
                "model version cannot be empty".to_string(),
            ));
        }

        let url = self.endpoint_url(kind, model_version)?;
        let start = Instant::now();
        let result = self.fetch_url(kind, url).await;

        metrics::histogram!("ml_monitor_fetch_duration_seconds", "endpoint" => kind.as_str())
            .record(start.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::counter!("ml_monitor_fetch_total",
            "endpoint" => kind.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        match &result {
            Ok(payload) => tracing::debug!(
                endpoint = %kind,
                model_version = model_version,
                records = payload.len(),
                latency_ms = start.elapsed().as_millis() as u64,
                "Fetched metrics feed"
            ),
            Err(e) => tracing::debug!(
                endpoint = %kind,
                model_version = model_version,
                error = %e,
                "Metrics fetch failed"
            ),
        }

        result
    }

    async fn fetch_url(&self, kind: EndpointKind, url: Url) -> Result<RawPayload, FetchError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.classify_error(e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify_error(e))?;

        match kind {
            EndpointKind::Performance => parse_metrics_response(&body).map(RawPayload::Performance),
            EndpointKind::Drift => parse_drift_response(&body).map(RawPayload::Drift),
        }
    }

    /// Classify reqwest error into FetchError.
    fn classify_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout.map(|t| t.as_secs()).unwrap_or_default())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl MetricsSource for MetricsClient {
    async fn fetch(
        &self,
        kind: EndpointKind,
        model_version: &str,
    ) -> Result<RawPayload, FetchError> {
        MetricsClient::fetch(self, kind, model_version).await
    }
}
