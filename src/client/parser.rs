//! Response parsing and validation for the metrics feeds.
//!
//! Anything that does not match the expected shape is turned into
//! [`FetchError::InvalidPayload`] here, so the transform stage only ever sees
//! well-typed records.

use super::error::FetchError;
use super::types::{FeatureDriftRecord, MetricSample};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Deserialize;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// `/api/metrics/{version}` row format
#[derive(Deserialize)]
struct WireSample {
    timestamp: serde_json::Value,
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(default)]
    data_drift_score: Option<f64>,
    #[serde(default)]
    precision: Option<f64>,
    #[serde(default)]
    recall: Option<f64>,
    #[serde(default)]
    f1_score: Option<f64>,
}

/// Parse a performance feed body.
pub fn parse_metrics_response(body: &str) -> Result<Vec<MetricSample>, FetchError> {
    let rows: Vec<WireSample> = serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidPayload(format!("metrics payload: {}", e)))?;

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
                FetchError::InvalidPayload(format!(
                    "metrics[{}].timestamp is not a valid time: {}",
                    i, row.timestamp
                ))
            })?;
            Ok(MetricSample {
                timestamp,
                accuracy: row.accuracy,
                data_drift_score: row.data_drift_score,
                precision: row.precision,
                recall: row.recall,
                f1_score: row.f1_score,
            })
        })
        .collect()
}

/// Parse a feature drift feed body.
pub fn parse_drift_response(body: &str) -> Result<Vec<FeatureDriftRecord>, FetchError> {
    let records: Vec<FeatureDriftRecord> = serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidPayload(format!("feature drift payload: {}", e)))?;

    if let Some(i) = records.iter().position(|r| r.feature_name.is_empty()) {
        return Err(FetchError::InvalidPayload(format!(
            "feature_drift[{}].feature_name is empty",
            i
        )));
    }

    Ok(records)
}

/// Interpret a timestamp as local wall-clock time.
///
/// Accepts RFC 3339 strings (converted to local time), naive ISO-8601 strings
/// (taken as local already) and integer epoch milliseconds.
pub fn parse_timestamp(value: &serde_json::Value) -> Option<NaiveDateTime> {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Local).naive_local());
            }
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        }
        serde_json::Value::Number(n) => {
            let millis = n.as_i64()?;
            Local
                .timestamp_millis_opt(millis)
                .single()
                .map(|dt| dt.naive_local())
        }
        _ => None,
    }
}
