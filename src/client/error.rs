//! Error types for metrics fetches.

use thiserror::Error;

/// Errors that can occur while fetching a metrics feed.
///
/// Every variant is a transport-level failure from the caller's point of view:
/// the dashboard maps all of them to the same fixed message.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// Connection refused, DNS failure, reset, etc.
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded the configured deadline
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Service answered with a non-2xx status
    #[error("HTTP error: {0}")]
    Status(u16),

    /// Body did not match the expected payload shape
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Request could not be built (empty model version, bad base URL)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Payload was valid but could not be turned into chart labels
    #[error("render error: {0}")]
    Render(String),
}

impl FetchError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Timeout(_) => "timeout",
            FetchError::Status(_) => "status",
            FetchError::InvalidPayload(_) => "invalid_payload",
            FetchError::InvalidRequest(_) => "invalid_request",
            FetchError::Render(_) => "render",
        }
    }
}
