//! Dashboard presentation configuration

use crate::transform::DEFAULT_TIME_FORMAT;
use serde::{Deserialize, Serialize};

/// Dashboard settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Model version opened by the landing page's demo link and by
    /// `ml-monitor dashboard` when no version is given
    pub demo_model_version: String,
    /// chrono format string for time-axis labels
    pub time_format: String,
    /// Also plot precision, recall and F1 on the performance chart
    pub show_classification_metrics: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            demo_model_version: "cancer_model_v1.0".to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            show_classification_metrics: false,
        }
    }
}
