//! Shared test utilities for ML-Monitor integration tests.
//!
//! Provides a mock metrics service and payload builders so each test file
//! only describes the responses it cares about.

#![allow(dead_code)]

use ml_monitor::client::MetricsClient;
use ml_monitor::config::{MonitorConfig, ServiceConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Well-Known Test Constants
// =============================================================================

pub const DEMO_VERSION: &str = "cancer_model_v1.0";

// =============================================================================
// Payload Builders
// =============================================================================

/// One performance sample as the service serializes it.
pub fn sample(timestamp: &str, accuracy: f64, drift: f64) -> Value {
    json!({
        "timestamp": timestamp,
        "accuracy": accuracy,
        "data_drift_score": drift,
    })
}

/// Two samples, oldest first.
pub fn metrics_body() -> Value {
    json!([
        sample("2024-05-01T10:00:00", 0.91, 0.12),
        sample("2024-05-01T10:00:15", 0.89, 0.18),
    ])
}

/// Drift records, most drifted first, as the service orders them.
pub fn drift_body() -> Value {
    json!([
        {"feature_name": "zip", "drift_score": 0.9, "p_value": 0.001},
        {"feature_name": "income", "drift_score": 0.5, "p_value": 0.02},
        {"feature_name": "age", "drift_score": 0.1, "p_value": 0.4},
    ])
}

pub fn metrics_path(version: &str) -> String {
    format!("/api/metrics/{}", version)
}

pub fn drift_path(version: &str) -> String {
    format!("/api/feature_drift/{}", version)
}

// =============================================================================
// Mock Service
// =============================================================================

/// Serve `body` for GET `route`.
pub async fn mount_json(server: &MockServer, route: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Mock service answering both feeds for `version`.
pub async fn healthy_service(version: &str) -> MockServer {
    let server = MockServer::start().await;
    mount_json(&server, &metrics_path(version), 200, metrics_body()).await;
    mount_json(&server, &drift_path(version), 200, drift_body()).await;
    server
}

// =============================================================================
// Client Builders
// =============================================================================

pub fn service_config(base_url: &str) -> ServiceConfig {
    ServiceConfig {
        base_url: base_url.to_string(),
        timeout_seconds: Some(5),
    }
}

pub fn client_for(server: &MockServer) -> MetricsClient {
    MetricsClient::new(&service_config(&server.uri())).unwrap()
}

/// Default configuration pointed at `server`.
pub fn config_for(server: &MockServer) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.service = service_config(&server.uri());
    config
}
