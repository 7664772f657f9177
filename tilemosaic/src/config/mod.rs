//! User configuration (~/.tilemosaic/config.ini).
//!
//! All keys are optional; missing keys take the defaults in [`defaults`].
//! Command-line flags override file values.
//!
//! # Example
//!
//! ```no_run
//! use tilemosaic::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let spec = config.provider_spec()?;
//! let scheduler_config = config.scheduler_config();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DownloadSettings, LoggingSettings, OutputSettings, ProviderSettings};
