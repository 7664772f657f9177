//! Default values for every configuration key.

use std::path::PathBuf;
use std::time::Duration;

use super::settings::*;
use crate::fetch::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_POLITE_DELAY, DEFAULT_POLITE_JITTER,
    DEFAULT_REQUEST_TIMEOUT,
};

pub const DEFAULT_PROVIDER_TYPE: &str = "bing";
pub const DEFAULT_PROVIDER_MODE: &str = "satellite";

/// Simultaneous downloads
pub const DEFAULT_PARALLEL: usize = DEFAULT_CONCURRENCY;

/// Per-request timeout in seconds
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = DEFAULT_REQUEST_TIMEOUT.as_secs();

pub const DEFAULT_DOWNLOAD_MAX_RETRIES: u32 = DEFAULT_MAX_RETRIES;

pub const DEFAULT_POLITE_DELAY_MS: u64 = duration_ms(DEFAULT_POLITE_DELAY);
pub const DEFAULT_POLITE_JITTER_MS: u64 = duration_ms(DEFAULT_POLITE_JITTER);

/// Upper bound accepted for `parallel`
pub const MAX_PARALLEL: usize = 64;

pub const DEFAULT_OUTPUT_DIRECTORY: &str = "./tiles";

pub const LOG_FILE_NAME: &str = "tilemosaic.log";

const fn duration_ms(d: Duration) -> u64 {
    d.as_secs() * 1000 + d.subsec_millis() as u64
}

/// Default log file (~/.tilemosaic/tilemosaic.log).
pub fn default_log_file() -> PathBuf {
    super::file::config_directory().join(LOG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            provider: ProviderSettings {
                provider_type: DEFAULT_PROVIDER_TYPE.to_string(),
                mode: DEFAULT_PROVIDER_MODE.to_string(),
            },
            download: DownloadSettings {
                parallel: DEFAULT_PARALLEL,
                timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
                max_retries: DEFAULT_DOWNLOAD_MAX_RETRIES,
                polite_delay_ms: DEFAULT_POLITE_DELAY_MS,
                polite_jitter_ms: DEFAULT_POLITE_JITTER_MS,
                user_agents: None,
            },
            output: OutputSettings {
                directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
                sentinel: None,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
