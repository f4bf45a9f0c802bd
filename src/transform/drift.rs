//! Feature drift ranking.

use super::{ChartSeries, Dimension};
use crate::client::FeatureDriftRecord;

/// Number of features shown on the drift chart by default
pub const DEFAULT_TOP_N: usize = 5;

pub const DRIFT_SCORE: &str = "Drift Score";

/// Picks the top-N most drifted features for a horizontal bar chart.
///
/// Input is expected most-significant first (ascending p-value). The selected
/// slice is reversed so the most drifted feature is the last category, which a
/// horizontal bar chart draws at the top.
#[derive(Debug, Clone)]
pub struct DriftRanker {
    top_n: usize,
    /// Stable-sort by significance instead of trusting service order
    defensive_sort: bool,
}

impl Default for DriftRanker {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

impl DriftRanker {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            defensive_sort: false,
        }
    }

    pub fn with_defensive_sort(mut self, enabled: bool) -> Self {
        self.defensive_sort = enabled;
        self
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Rank records, or `None` when there are none.
    ///
    /// A ranker with `top_n == 0` selects nothing and also returns `None`.
    pub fn rank(&self, records: &[FeatureDriftRecord]) -> Option<ChartSeries> {
        if records.is_empty() || self.top_n == 0 {
            return None;
        }

        let mut ordered: Vec<&FeatureDriftRecord> = records.iter().collect();
        if self.defensive_sort {
            // Stable: equal p-values keep service order
            ordered.sort_by(|a, b| a.significance().total_cmp(&b.significance()));
        }

        let mut selected: Vec<&FeatureDriftRecord> =
            ordered.into_iter().take(self.top_n).collect();
        selected.reverse();

        Some(ChartSeries {
            categories: selected.iter().map(|r| r.feature_name.clone()).collect(),
            dimensions: vec![Dimension {
                name: DRIFT_SCORE.to_string(),
                values: selected.iter().map(|r| r.drift_score).collect(),
            }],
        })
    }
}
