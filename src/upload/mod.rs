//! Model registration flow.
//!
//! Collects a model name, version, model artifact and reference dataset,
//! sends them as one multipart request to `/upload_and_register`, and hands
//! back the dashboard route for the registered model version.

mod error;

pub use error::UploadError;

use crate::client::MetricsClient;
use crate::dashboard::Route;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use std::path::{Path, PathBuf};

/// Registration endpoint, relative to the service root
pub const REGISTER_PATH: &str = "upload_and_register";

/// User input for a registration. Only presence is validated client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub model_name: String,
    pub model_version: String,
    pub model_file: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub description: Option<String>,
}

impl UploadForm {
    /// Check that all four required inputs are present.
    pub fn validate(&self) -> Result<(), UploadError> {
        let complete = !self.model_name.trim().is_empty()
            && !self.model_version.trim().is_empty()
            && self.model_file.is_some()
            && self.data_file.is_some();
        if complete {
            Ok(())
        } else {
            Err(UploadError::MissingFields)
        }
    }
}

/// Whether the form accepts a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Submitting,
}

/// Registration client.
#[derive(Debug)]
pub struct UploadFlow {
    client: reqwest::Client,
    endpoint: Url,
    state: UploadState,
}

impl UploadFlow {
    /// Register against the same service the metrics client polls.
    pub fn new(metrics: &MetricsClient) -> Result<Self, UploadError> {
        let endpoint = metrics.url_for([REGISTER_PATH]).map_err(|e| {
            tracing::error!(error = %e, "Cannot build registration URL");
            UploadError::Failed
        })?;
        Ok(Self {
            client: metrics.http().clone(),
            endpoint,
            state: UploadState::Idle,
        })
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    /// The submit button is enabled only while idle.
    pub fn is_enabled(&self) -> bool {
        self.state == UploadState::Idle
    }

    /// Validate and submit the form.
    ///
    /// On success returns the dashboard route for the registered version. On
    /// any failure the flow returns to idle so the form can be resubmitted.
    pub async fn submit(&mut self, form: &UploadForm) -> Result<Route, UploadError> {
        form.validate()?;

        self.state = UploadState::Submitting;
        let result = self.send(form).await;
        self.state = UploadState::Idle;

        match &result {
            Ok(route) => tracing::info!(
                model_name = %form.model_name,
                model_version = %form.model_version,
                route = %route,
                "Model registered"
            ),
            Err(e) => tracing::warn!(
                model_name = %form.model_name,
                model_version = %form.model_version,
                error = %e,
                "Model registration failed"
            ),
        }

        result
    }

    async fn send(&self, form: &UploadForm) -> Result<Route, UploadError> {
        let (Some(model_file), Some(data_file)) = (&form.model_file, &form.data_file) else {
            return Err(UploadError::MissingFields);
        };

        let mut multipart = Form::new()
            .text("model_name", form.model_name.clone())
            .text("model_version", form.model_version.clone());
        if let Some(description) = &form.description {
            multipart = multipart.text("description", description.clone());
        }
        let multipart = multipart
            .part("model_file", file_part(model_file).await?)
            .part("data_file", file_part(data_file).await?);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Registration request failed");
                UploadError::Failed
            })?;

        let status = response.status();
        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(status = status.as_u16(), error = %e, "Unreadable registration response");
                return Err(UploadError::Failed);
            }
        };

        if status.is_success() {
            if let Some(id) = body.get("model_version_id").and_then(|v| v.as_str()) {
                if !id.is_empty() {
                    return Ok(Route::dashboard(id));
                }
            }
        }

        match server_error(&body) {
            Some(message) => Err(UploadError::Server(message)),
            None => Err(UploadError::Failed),
        }
    }
}

/// Read a file into a multipart part named after the file.
async fn file_part(path: &Path) -> Result<Part, UploadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(file_name))
}

/// Pull the server's error text out of a response body.
///
/// Accepts `{"error": "..."}` and the `[{"error": "..."}, status]` pair the
/// service sends for duplicate registrations.
fn server_error(body: &serde_json::Value) -> Option<String> {
    let object = match body {
        serde_json::Value::Array(items) => items.first()?,
        other => other,
    };
    object
        .get("error")
        .and_then(|e| e.as_str())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}
