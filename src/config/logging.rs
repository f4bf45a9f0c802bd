//! `[logging]` section: verbosity and output shape of diagnostics on stderr

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One compact line per event, for a terminal next to the dashboard
    #[default]
    Pretty,
    /// Newline-delimited JSON for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    /// Case-insensitive, so `ML_MONITOR_LOG_FORMAT=JSON` works.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("pretty") {
            Ok(LogFormat::Pretty)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(ConfigError::Validation {
                field: "logging.format".to_string(),
                message: format!("expected 'pretty' or 'json', got '{}'", s),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base `EnvFilter` level for the whole crate
    pub level: String,
    pub format: LogFormat,
    /// Per-module overrides keyed by module under `ml_monitor`, e.g. `polling = "debug"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<BTreeMap<String, String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            // Quiet enough not to scroll the live dashboard away
            level: "warn".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        }
    }
}
