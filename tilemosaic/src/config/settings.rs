//! Typed configuration sections.
//!
//! One struct per INI `[section]`, plus conversions into library types.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::{IdentityPool, PolitenessPolicy, SchedulerConfig};
use crate::provider::{ProviderError, ProviderSpec};

/// Parsed contents of `config.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub provider: ProviderSettings,
    pub download: DownloadSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

/// Provider selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// "bing", "yandex" or "pkk"
    pub provider_type: String,
    /// "satellite", "road", "cadastre" or "thematic"
    pub mode: String,
}

/// Download behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Simultaneous downloads
    pub parallel: usize,
    /// Per-request timeout in seconds
    pub timeout: u64,
    /// Extra attempts for transient failures
    pub max_retries: u32,
    /// Base pause between requests to rate-limited providers
    pub polite_delay_ms: u64,
    /// Upper bound of the random extra pause
    pub polite_jitter_ms: u64,
    /// File with one user agent per line
    pub user_agents: Option<PathBuf>,
}

/// Where tiles go.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub directory: PathBuf,
    /// Image of the provider's "no imagery" tile
    pub sentinel: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl ConfigFile {
    /// Resolves the configured provider and mode.
    pub fn provider_spec(&self) -> Result<ProviderSpec, ProviderError> {
        ProviderSpec::from_names(&self.provider.provider_type, &self.provider.mode)
    }

    /// Scheduler settings from the `[download]` section.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new()
            .with_concurrency(self.download.parallel)
            .with_request_timeout(Duration::from_secs(self.download.timeout))
            .with_max_retries(self.download.max_retries)
            .with_politeness(PolitenessPolicy::new(
                Duration::from_millis(self.download.polite_delay_ms),
                Duration::from_millis(self.download.polite_jitter_ms),
            ))
    }

    /// User-agent pool; the fixed default when no file is configured.
    pub fn identity_pool(&self) -> io::Result<IdentityPool> {
        match &self.download.user_agents {
            Some(path) => IdentityPool::from_file(path),
            None => Ok(IdentityPool::fixed()),
        }
    }
}
