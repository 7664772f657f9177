//! CLI runner for common setup.
//!
//! Encapsulates config loading and logging initialization so command
//! handlers start from the same state.

use std::path::Path;

use tilemosaic::config::ConfigFile;
use tilemosaic::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle.
pub struct CliRunner {
    /// Held for its drop: flushes the log file on exit
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load config (from `config_path`, or the default location) and
    /// initialize logging.
    ///
    /// When stdout is a TTY, stdout logging is disabled so log lines do not
    /// tear through the progress bar; everything still goes to the log file.
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let stdout_enabled = !atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging(&config.logging.file, stdout_enabled, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Effective configuration (file values or defaults).
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Records the version and command at the top of the log.
    pub fn log_startup(&self, command: &str) {
        info!("TileMosaic v{}", tilemosaic::VERSION);
        info!("TileMosaic CLI: {} command", command);
        info!(log_file = %self.config.logging.file.display(), "Logging to file");
    }
}
