//! Output formatting helpers for CLI commands

use crate::dashboard::Route;
use crate::polling::{ChartKind, ChartViewModel, ViewResult};
use crate::transform::ChartSeries;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use serde_json::json;

/// Width of the longest drift bar, in characters
const BAR_WIDTH: usize = 40;

/// Placeholder for a value the service did not report
const MISSING: &str = "—";

/// Heading printed above both charts
pub fn format_dashboard_header(model_version: &str) -> String {
    format!(
        "{}\nTracking: {}",
        "ML-Monitor Dashboard".bold(),
        model_version.cyan()
    )
}

/// Landing page: the two entry points into the application
pub fn format_landing(demo: &Route) -> String {
    format!(
        "{}\n\nMonitor model performance and feature drift in real time.\n\n  \
         View demo dashboard:  ml-monitor open {}\n  \
         Register a model:     ml-monitor open {}\n",
        "Welcome to ML-Monitor".bold(),
        demo.path(),
        Route::Upload.path()
    )
}

/// Upload page: how to submit the registration form from the command line
pub fn format_upload_page() -> String {
    format!(
        "{}\n\n  ml-monitor upload --name <NAME> --model-version <VERSION> \\\n      \
         --model-file <MODEL.joblib> --data-file <REFERENCE.csv>\n",
        "Register a New Model".bold()
    )
}

/// Both charts below the dashboard header
pub fn format_dashboard(performance: &ChartViewModel, drift: &ChartViewModel) -> String {
    let version = performance
        .model_version
        .as_deref()
        .or(drift.model_version.as_deref())
        .unwrap_or_default();

    format!(
        "{}\n\n{}\n\n{}",
        format_dashboard_header(version),
        format_chart(performance),
        format_chart(drift)
    )
}

/// One chart: title plus the series, a banner, or a loading line
pub fn format_chart(view: &ChartViewModel) -> String {
    let body = match &view.result {
        None => "Loading...".dimmed().to_string(),
        Some(ViewResult::Empty { message }) => message.yellow().to_string(),
        Some(ViewResult::Failed { message }) => message.red().to_string(),
        Some(ViewResult::Ok { series }) => match view.chart {
            ChartKind::Performance => format_performance_table(series),
            ChartKind::Drift => format_drift_bars(series),
        },
    };

    format!("{}\n{}", view.title.bold(), body)
}

/// Performance series as a table, one row per sample
pub fn format_performance_table(series: &ChartSeries) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec!["Time".to_string()];
    header.extend(series.dimensions.iter().map(|d| d.name.clone()));
    table.set_header(header);

    for (i, category) in series.categories.iter().enumerate() {
        let mut row = vec![Cell::new(category)];
        for dimension in &series.dimensions {
            let value = dimension.values.get(i).copied().unwrap_or(f64::NAN);
            row.push(Cell::new(format_value(value)).set_alignment(CellAlignment::Right));
        }
        table.add_row(row);
    }

    table.to_string()
}

/// Drift series as horizontal bars.
///
/// The ranker emits categories bottom-to-top, so they are printed in reverse
/// to keep the most drifted feature on the first line.
pub fn format_drift_bars(series: &ChartSeries) -> String {
    let Some(scores) = series.dimensions.first() else {
        return String::new();
    };

    let label_width = series
        .categories
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);
    let max = scores
        .values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let mut lines = Vec::with_capacity(series.len());
    for (name, &score) in series.categories.iter().zip(&scores.values).rev() {
        let width = if max > 0.0 && score.is_finite() {
            ((score / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        lines.push(format!(
            "{:<label_width$}  {} {}",
            name,
            "█".repeat(width).red(),
            format_value(score)
        ));
    }

    lines.join("\n")
}

/// Both views as one JSON document
pub fn format_dashboard_json(
    performance: &ChartViewModel,
    drift: &ChartViewModel,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "model_version": performance.model_version,
        "performance": performance,
        "drift": drift,
    }))
}

fn format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{:.4}", value)
    } else {
        MISSING.to_string()
    }
}
