//! CLI module for ML-Monitor
//!
//! # Commands
//!
//! - `dashboard` - Live dashboard for a model version
//! - `open` - Navigate to a path (`/`, `/upload`, `/dashboard/{version}`)
//! - `upload` - Register a model and reference dataset, then watch it
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Watch the demo model
//! ml-monitor dashboard
//!
//! # Print one snapshot of a specific version as JSON
//! ml-monitor dashboard loan_risk_v2 --once --json
//!
//! # Register a new model
//! ml-monitor upload --name "Loan Risk" --model-version v2 \
//!     --model-file model.joblib --data-file reference.csv
//! ```

pub mod completions;
pub mod config;
pub mod dashboard;
pub mod output;
pub mod upload;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::MonitorConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ML-Monitor - live model health dashboard
#[derive(Parser, Debug)]
#[command(
    name = "ml-monitor",
    version,
    about = "Live model performance and feature drift dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the dashboard for a model version
    Dashboard(DashboardArgs),
    /// Navigate to a path, as a browser would
    Open(OpenArgs),
    /// Register a model and reference dataset
    Upload(UploadArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that talks to the metrics service
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "ml-monitor.toml")]
    pub config: PathBuf,

    /// Override the metrics service URL
    #[arg(short = 'u', long, env = "ML_MONITOR_BASE_URL")]
    pub base_url: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ML_MONITOR_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// How the dashboard is printed
#[derive(Args, Debug, Clone)]
pub struct DisplayArgs {
    /// Override the refresh interval in seconds
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Print the first complete snapshot and exit
    #[arg(long)]
    pub once: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Model version to track (defaults to the configured demo version)
    pub model_version: Option<String>,

    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Navigation path, e.g. /dashboard/cancer_model_v1.0
    pub path: String,

    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Model name, e.g. "Loan Risk Predictor"
    #[arg(short, long)]
    pub name: Option<String>,

    /// Model version, e.g. v1.0
    #[arg(long = "model-version")]
    pub model_version: Option<String>,

    /// Serialized model artifact (.joblib)
    #[arg(short, long)]
    pub model_file: Option<PathBuf>,

    /// Reference dataset (.csv)
    #[arg(short, long)]
    pub data_file: Option<PathBuf>,

    /// Free-form description stored with the registration
    #[arg(long)]
    pub description: Option<String>,

    /// Exit after registering instead of opening the dashboard
    #[arg(long)]
    pub no_follow: bool,

    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "ml-monitor.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    service: &ServiceArgs,
    display: &DisplayArgs,
) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if service.config.exists() {
        MonitorConfig::load(Some(&service.config))?
    } else {
        MonitorConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref url) = service.base_url {
        config.service.base_url = url.clone();
    }
    if let Some(ref level) = service.log_level {
        config.logging.level = level.clone();
    }
    if let Some(interval) = display.interval {
        config.polling.interval_seconds = interval;
    }

    config.validate()?;
    Ok(config)
}
