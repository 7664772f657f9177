//! Fatal fetch errors.
//!
//! Per-tile problems are never errors at this level; they are reported as
//! [`super::FailureReason`] inside the batch summary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a batch before it starts.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The destination directory could not be created
    #[error("Failed to create output directory '{}': {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_directory_display() {
        let err = FetchError::OutputDirectory {
            path: PathBuf::from("/nope/tiles"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to create output directory '/nope/tiles': denied"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
