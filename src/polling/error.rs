//! Error types for the polling controller.

use thiserror::Error;

/// Errors returned when (re)starting a polling loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollingError {
    /// `start` was called without a model version
    #[error("model version cannot be empty")]
    EmptyModelVersion,
}
