//! Configuration module for ML-Monitor
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`ML_MONITOR_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use ml_monitor::config::MonitorConfig;
//!
//! let config = MonitorConfig::default();
//! assert_eq!(config.polling.interval_seconds, 15);
//!
//! let toml = r#"
//! [service]
//! base_url = "http://monitor:9000"
//! "#;
//! let config: MonitorConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.service.base_url, "http://monitor:9000");
//! assert_eq!(config.polling.top_n, 5);
//! ```

pub mod dashboard;
pub mod error;
pub mod logging;
pub mod polling;
pub mod service;

pub use dashboard::DashboardConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use polling::PollingConfig;
pub use service::ServiceConfig;

use crate::transform::check_time_format;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bundled example written by `ml-monitor config init`
pub const EXAMPLE_CONFIG: &str = include_str!("../../ml-monitor.example.toml");

/// Unified configuration for the monitor client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Metrics service connection
    pub service: ServiceConfig,
    /// Refresh loop settings
    pub polling: PollingConfig,
    /// Presentation settings
    pub dashboard: DashboardConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("ML_MONITOR_BASE_URL") {
            self.service.base_url = url;
        }
        if let Ok(interval) = std::env::var("ML_MONITOR_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.polling.interval_seconds = secs;
            }
        }
        if let Ok(level) = std::env::var("ML_MONITOR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ML_MONITOR_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.base_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "service.base_url".to_string(),
                message: "base URL cannot be empty".to_string(),
            });
        }
        if self.polling.interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "polling.interval_seconds".to_string(),
                message: "interval must be non-zero".to_string(),
            });
        }
        if self.polling.top_n == 0 {
            return Err(ConfigError::Validation {
                field: "polling.top_n".to_string(),
                message: "must show at least one feature".to_string(),
            });
        }
        if let Err(e) = check_time_format(&self.dashboard.time_format) {
            return Err(ConfigError::Validation {
                field: "dashboard.time_format".to_string(),
                message: e.to_string(),
            });
        }
        if self.dashboard.demo_model_version.is_empty() {
            return Err(ConfigError::Validation {
                field: "dashboard.demo_model_version".to_string(),
                message: "demo model version cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}
