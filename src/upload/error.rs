//! Error types for model registration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the upload form.
///
/// `Display` is the text shown to the user.
#[derive(Debug, Error)]
pub enum UploadError {
    /// A required field or file was left blank
    #[error("All fields and files are required.")]
    MissingFields,

    /// A selected file could not be read
    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The service rejected the registration; its message is shown verbatim
    #[error("{0}")]
    Server(String),

    /// Transport failure or a response without a usable message
    #[error("An error occurred during upload.")]
    Failed,
}
