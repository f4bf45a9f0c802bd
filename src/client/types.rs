//! Wire types for the metrics service feeds.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which metrics feed to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    /// Prediction performance over time (`/api/metrics/{version}`)
    Performance,
    /// Per-feature drift ranking (`/api/feature_drift/{version}`)
    Drift,
}

impl EndpointKind {
    /// Path prefix on the metrics service; the model version is appended as a segment.
    pub fn path_prefix(self) -> &'static str {
        match self {
            EndpointKind::Performance => "api/metrics",
            EndpointKind::Drift => "api/feature_drift",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EndpointKind::Performance => "performance",
            EndpointKind::Drift => "drift",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aggregated performance window reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    /// Local wall-clock time of the window
    pub timestamp: NaiveDateTime,
    pub accuracy: Option<f64>,
    pub data_drift_score: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
}

/// Drift test result for a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDriftRecord {
    pub feature_name: String,
    pub drift_score: f64,
    /// Significance of the drift test. The service currently reports the
    /// p-value as `drift_score` and omits this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
}

impl FeatureDriftRecord {
    /// Value the service orders by: the p-value when present, else the drift score.
    pub fn significance(&self) -> f64 {
        self.p_value.unwrap_or(self.drift_score)
    }
}

/// Parsed body of a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Performance(Vec<MetricSample>),
    Drift(Vec<FeatureDriftRecord>),
}

impl RawPayload {
    pub fn kind(&self) -> EndpointKind {
        match self {
            RawPayload::Performance(_) => EndpointKind::Performance,
            RawPayload::Drift(_) => EndpointKind::Drift,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawPayload::Performance(samples) => samples.len(),
            RawPayload::Drift(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
