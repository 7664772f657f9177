//! Argument groups and config fallback shared by commands.
//!
//! Every value given on the command line wins over the config file.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tilemosaic::config::ConfigFile;
use tilemosaic::coord::GeoBoundingBox;
use tilemosaic::fetch::SchedulerConfig;
use tilemosaic::provider::ProviderSpec;

use crate::error::CliError;

/// Provider and mode selection.
#[derive(Args, Debug, Clone, Default)]
pub struct ProviderArgs {
    /// Provider: bing, yandex, pkk (default from config)
    #[arg(long)]
    pub provider: Option<String>,

    /// Mode: satellite, road, or for pkk cadastre, thematic (default from config)
    #[arg(long)]
    pub mode: Option<String>,
}

impl ProviderArgs {
    /// Resolve to a provider spec, filling gaps from the config file.
    ///
    /// An explicit provider without a mode falls back to the provider's
    /// first mode rather than the configured one, which may belong to a
    /// different provider.
    pub fn resolve(&self, config: &ConfigFile) -> Result<ProviderSpec, CliError> {
        let provider = self
            .provider
            .as_deref()
            .unwrap_or(&config.provider.provider_type);

        let mode = match (&self.mode, &self.provider) {
            (Some(mode), _) => mode.as_str(),
            (None, Some(_)) => default_mode(provider),
            (None, None) => config.provider.mode.as_str(),
        };

        Ok(ProviderSpec::from_names(provider, mode)?)
    }
}

fn default_mode(provider: &str) -> &'static str {
    if provider.trim().eq_ignore_ascii_case("pkk") {
        "cadastre"
    } else {
        "satellite"
    }
}

/// Bounding box and zoom.
#[derive(Args, Debug, Clone)]
pub struct AreaArgs {
    /// First latitude of the box (either edge)
    #[arg(long, allow_negative_numbers = true)]
    pub lat_start: f64,

    /// Second latitude of the box
    #[arg(long, allow_negative_numbers = true)]
    pub lat_stop: f64,

    /// First longitude of the box (either edge)
    #[arg(long, allow_negative_numbers = true)]
    pub lon_start: f64,

    /// Second longitude of the box
    #[arg(long, allow_negative_numbers = true)]
    pub lon_stop: f64,

    /// Zoom level
    #[arg(short, long)]
    pub zoom: u8,
}

impl AreaArgs {
    pub fn bounding_box(&self) -> GeoBoundingBox {
        GeoBoundingBox::new(self.lat_start, self.lat_stop, self.lon_start, self.lon_stop)
    }
}

/// Download tuning.
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Tile directory (default from config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum concurrent downloads (default from config)
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Per-request timeout in seconds (default from config)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Retries per tile after the first attempt (default from config)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Fetch tiles in grid order instead of shuffled
    #[arg(long)]
    pub no_shuffle: bool,

    /// Seed for shard choice, fetch order and pacing
    #[arg(long)]
    pub seed: Option<u64>,
}

impl DownloadArgs {
    pub fn output_dir(&self, config: &ConfigFile) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| config.output.directory.clone())
    }

    pub fn scheduler_config(&self, config: &ConfigFile) -> SchedulerConfig {
        let mut scheduler = config.scheduler_config();
        if let Some(parallel) = self.parallel {
            scheduler = scheduler.with_concurrency(parallel);
        }
        if let Some(timeout) = self.timeout {
            scheduler = scheduler.with_request_timeout(Duration::from_secs(timeout));
        }
        if let Some(retries) = self.retries {
            scheduler = scheduler.with_max_retries(retries);
        }
        scheduler
    }
}
