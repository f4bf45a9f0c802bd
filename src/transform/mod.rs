//! Raw payload to chart series conversion.
//!
//! Both transforms are synchronous and return `None` for an empty input:
//! "no data yet" is a normal display state, distinct from a fetch failure,
//! and is never represented as a zero-length series.

pub mod drift;
pub mod series;

pub use drift::{DriftRanker, DEFAULT_TOP_N};
pub use series::{check_time_format, SeriesTransformer, TimeFormatError, DEFAULT_TIME_FORMAT};

use serde::Serialize;

/// One plotted dimension. `values[i]` belongs to `categories[i]` of the owning series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub name: String,
    /// Missing values are carried as `NaN`
    pub values: Vec<f64>,
}

/// Visualization-ready data for one chart: a category axis shared by every dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub categories: Vec<String>,
    pub dimensions: Vec<Dimension>,
}

impl ChartSeries {
    /// Number of points on the category axis.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look up a dimension by name.
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}
