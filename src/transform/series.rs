//! Performance samples to time series.

use super::{ChartSeries, Dimension};
use crate::client::MetricSample;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt::Write;
use thiserror::Error;

/// Default time label, e.g. `10:00:00 AM`
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M:%S %p";

pub const ACCURACY: &str = "Accuracy";
pub const DATA_DRIFT_SCORE: &str = "Data Drift Score";
pub const PRECISION: &str = "Precision";
pub const RECALL: &str = "Recall";
pub const F1_SCORE: &str = "F1 Score";

/// A time format chrono cannot render for a local timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("time format '{0}' cannot render a timestamp")]
pub struct TimeFormatError(pub String);

/// Check that `format` renders a naive local timestamp.
///
/// Rejects unknown specifiers as well as ones that need data a
/// `NaiveDateTime` does not carry, such as `%z`.
pub fn check_time_format(format: &str) -> Result<(), TimeFormatError> {
    let invalid = || TimeFormatError(format.to_string());

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }

    let probe = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .ok_or_else(invalid)?;
    let mut rendered = String::new();
    write!(rendered, "{}", probe.format(format)).map_err(|_| invalid())
}

/// Converts performance samples into a time axis plus parallel value series.
#[derive(Debug, Clone)]
pub struct SeriesTransformer {
    /// chrono format string for category labels
    time_format: String,
    /// Also emit precision, recall and F1
    include_classification: bool,
    /// Stable-sort by timestamp instead of trusting service order
    defensive_sort: bool,
}

impl Default for SeriesTransformer {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            include_classification: false,
            defensive_sort: false,
        }
    }
}

impl SeriesTransformer {
    pub fn new(time_format: impl Into<String>) -> Self {
        Self {
            time_format: time_format.into(),
            ..Self::default()
        }
    }

    pub fn with_classification_metrics(mut self, enabled: bool) -> Self {
        self.include_classification = enabled;
        self
    }

    pub fn with_defensive_sort(mut self, enabled: bool) -> Self {
        self.defensive_sort = enabled;
        self
    }

    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    /// Transform samples into a chart series, or `None` when there are none.
    ///
    /// Values are emitted in input order without validation. Also `None` when
    /// the time format cannot render; use [`try_transform`](Self::try_transform)
    /// to tell the two apart.
    pub fn transform(&self, samples: &[MetricSample]) -> Option<ChartSeries> {
        self.try_transform(samples).ok().flatten()
    }

    /// Like [`transform`](Self::transform), but reports an unrenderable time format.
    pub fn try_transform(
        &self,
        samples: &[MetricSample],
    ) -> Result<Option<ChartSeries>, TimeFormatError> {
        if samples.is_empty() {
            return Ok(None);
        }

        let mut ordered: Vec<&MetricSample> = samples.iter().collect();
        if self.defensive_sort {
            ordered.sort_by_key(|s| s.timestamp);
        }

        let mut categories = Vec::with_capacity(ordered.len());
        for sample in &ordered {
            let mut label = String::new();
            write!(label, "{}", sample.timestamp.format(&self.time_format))
                .map_err(|_| TimeFormatError(self.time_format.clone()))?;
            categories.push(label);
        }

        let column = |name: &str, pick: fn(&MetricSample) -> Option<f64>| Dimension {
            name: name.to_string(),
            values: ordered.iter().map(|s| pick(s).unwrap_or(f64::NAN)).collect(),
        };

        let mut dimensions = vec![
            column(ACCURACY, |s| s.accuracy),
            column(DATA_DRIFT_SCORE, |s| s.data_drift_score),
        ];
        if self.include_classification {
            dimensions.push(column(PRECISION, |s| s.precision));
            dimensions.push(column(RECALL, |s| s.recall));
            dimensions.push(column(F1_SCORE, |s| s.f1_score));
        }

        Ok(Some(ChartSeries {
            categories,
            dimensions,
        }))
    }
}
