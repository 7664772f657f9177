//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use tilemosaic::config::ConfigFileError;
use tilemosaic::coord::CoordError;
use tilemosaic::fetch::FetchError;
use tilemosaic::mosaic::MosaicError;
use tilemosaic::provider::ProviderError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Async runtime could not be started
    Runtime(String),
    /// Invalid bounding box or zoom
    Coordinates(CoordError),
    /// Unknown provider, mode, or unsupported zoom
    Provider(ProviderError),
    /// Fetch could not start
    Fetch(FetchError),
    /// Some tiles could not be downloaded
    IncompleteFetch { failed: usize, total: usize },
    /// Interrupted by the user
    Cancelled,
    /// Mosaic assembly failed
    Mosaic(MosaicError),
    /// External georeferencing tool failed
    External { tool: String, message: String },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::IncompleteFetch { .. } | CliError::Cancelled => {
                eprintln!();
                eprintln!("Downloaded tiles are kept. Run the same command again to fetch");
                eprintln!("only the missing tiles.");
            }
            CliError::External { tool, .. } => {
                eprintln!();
                eprintln!("Make sure '{}' is installed and on your PATH", tool);
                eprintln!("(GDAL: sudo apt install gdal-bin on Debian/Ubuntu).");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(msg) => write!(f, "Failed to start async runtime: {}", msg),
            CliError::Coordinates(e) => write!(f, "Invalid area: {}", e),
            CliError::Provider(e) => write!(f, "{}", e),
            CliError::Fetch(e) => write!(f, "{}", e),
            CliError::IncompleteFetch { failed, total } => {
                write!(f, "{} of {} tiles could not be downloaded", failed, total)
            }
            CliError::Cancelled => write!(f, "Cancelled"),
            CliError::Mosaic(e) => write!(f, "Failed to assemble mosaic: {}", e),
            CliError::External { tool, message } => write!(f, "{} failed: {}", tool, message),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Coordinates(e) => Some(e),
            CliError::Provider(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            CliError::Mosaic(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinates(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<MosaicError> for CliError {
    fn from(e: MosaicError) -> Self {
        CliError::Mosaic(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_fetch_message() {
        let err = CliError::IncompleteFetch {
            failed: 3,
            total: 40,
        };
        assert_eq!(err.to_string(), "3 of 40 tiles could not be downloaded");
    }

    #[test]
    fn test_provider_error_converts() {
        let err: CliError = ProviderError::UnknownProvider("osm".to_string()).into();
        assert!(matches!(err, CliError::Provider(_)));
        assert!(err.to_string().contains("osm"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
