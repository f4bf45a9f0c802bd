//! Per-chart view state published by the polling controller.

use crate::client::{EndpointKind, FetchError, RawPayload};
use crate::config::{DashboardConfig, PollingConfig};
use crate::transform::{ChartSeries, DriftRanker, SeriesTransformer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// The two charts on a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Performance,
    Drift,
}

impl ChartKind {
    /// Feed that backs this chart.
    pub fn endpoint(self) -> EndpointKind {
        match self {
            ChartKind::Performance => EndpointKind::Performance,
            ChartKind::Drift => EndpointKind::Drift,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Performance => "Model Performance",
            ChartKind::Drift => "Top Most Drifted Features",
        }
    }

    /// Shown when the feed answered with zero records.
    pub fn empty_message(self) -> &'static str {
        match self {
            ChartKind::Performance => "No data available for this model yet.",
            ChartKind::Drift => "No feature drift data available.",
        }
    }

    /// Shown for any fetch failure; the underlying cause is only logged.
    pub fn failure_message(self) -> &'static str {
        match self {
            ChartKind::Performance => "Failed to fetch metrics. Is the backend server running?",
            ChartKind::Drift => "Failed to fetch feature drift data.",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint().as_str())
    }
}

/// What the chart area shows. Exactly one variant is active at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewResult {
    Ok { series: ChartSeries },
    Empty { message: String },
    Failed { message: String },
}

/// Current visualization state of one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartViewModel {
    pub chart: ChartKind,
    pub title: &'static str,
    /// Version this view is bound to; `None` before the first `start`
    pub model_version: Option<String>,
    /// Polling epoch that produced this view
    pub generation: u64,
    /// `None` until the first response of the current generation lands
    pub result: Option<ViewResult>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChartViewModel {
    pub fn idle(chart: ChartKind) -> Self {
        Self {
            chart,
            title: chart.title(),
            model_version: None,
            generation: 0,
            result: None,
            updated_at: None,
        }
    }

    /// Fresh view for a new polling epoch.
    pub fn loading(chart: ChartKind, model_version: &str, generation: u64) -> Self {
        Self {
            model_version: Some(model_version.to_string()),
            generation,
            ..Self::idle(chart)
        }
    }

    pub fn is_loading(&self) -> bool {
        self.result.is_none()
    }

    pub fn series(&self) -> Option<&ChartSeries> {
        match &self.result {
            Some(ViewResult::Ok { series }) => Some(series),
            _ => None,
        }
    }

    /// Message for the error/empty banner, if one should be shown.
    pub fn message(&self) -> Option<&str> {
        match &self.result {
            Some(ViewResult::Empty { message }) | Some(ViewResult::Failed { message }) => {
                Some(message)
            }
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.result, Some(ViewResult::Failed { .. }))
    }
}

/// Transform stage bound to one chart.
#[derive(Debug, Clone)]
pub enum ChartTransform {
    Series(SeriesTransformer),
    Drift(DriftRanker),
}

impl ChartTransform {
    /// Build the transform for `chart` from configuration.
    pub fn for_chart(chart: ChartKind, polling: &PollingConfig, dashboard: &DashboardConfig) -> Self {
        match chart {
            ChartKind::Performance => ChartTransform::Series(
                SeriesTransformer::new(dashboard.time_format.clone())
                    .with_classification_metrics(dashboard.show_classification_metrics)
                    .with_defensive_sort(polling.defensive_sort),
            ),
            ChartKind::Drift => ChartTransform::Drift(
                DriftRanker::new(polling.top_n).with_defensive_sort(polling.defensive_sort),
            ),
        }
    }

    /// Apply to a fetched payload. `Ok(None)` means the feed was empty.
    pub fn apply(&self, payload: &RawPayload) -> Result<Option<ChartSeries>, FetchError> {
        match (self, payload) {
            (ChartTransform::Series(t), RawPayload::Performance(samples)) => t
                .try_transform(samples)
                .map_err(|e| FetchError::Render(e.to_string())),
            (ChartTransform::Drift(r), RawPayload::Drift(records)) => Ok(r.rank(records)),
            (_, other) => Err(FetchError::InvalidPayload(format!(
                "unexpected {} payload for this chart",
                other.kind()
            ))),
        }
    }
}
