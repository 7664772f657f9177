//! Fetch command - download every tile covering a bounding box.

use std::path::Path;
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tilemosaic::config::ConfigFile;
use tilemosaic::fetch::{FetchProgress, FetchScheduler, FetchSummary, ReqwestClient};
use tilemosaic::plan::TilePlan;
use tilemosaic::provider::{ProviderResolver, ProviderSpec};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::{AreaArgs, DownloadArgs, ProviderArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Failed tiles listed individually before the rest are summarized.
const MAX_LISTED_FAILURES: usize = 10;

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub area: AreaArgs,

    #[command(flatten)]
    pub provider: ProviderArgs,

    #[command(flatten)]
    pub download: DownloadArgs,
}

pub fn run(config_path: Option<&Path>, verbose: bool, args: FetchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose)?;
    runner.log_startup("fetch");

    let spec = args.provider.resolve(runner.config())?;
    let summary = fetch_area(runner.config(), spec, &args.area, &args.download)?;
    check_summary(&summary)
}

/// Plan, resolve and download the tiles of `area`.
///
/// Ctrl-C stops new requests; tiles already written stay on disk.
pub fn fetch_area(
    config: &ConfigFile,
    spec: ProviderSpec,
    area: &AreaArgs,
    download: &DownloadArgs,
) -> Result<FetchSummary, CliError> {
    spec.check_zoom(area.zoom)?;
    let plan = TilePlan::new(&area.bounding_box(), area.zoom)?;

    let output_dir = download.output_dir(config);
    let mut resolver = match download.seed {
        Some(seed) => ProviderResolver::with_seed(spec, output_dir.clone(), seed),
        None => ProviderResolver::new(spec, output_dir.clone()),
    };
    let requests = if download.no_shuffle {
        plan.requests(&mut resolver)
    } else {
        plan.shuffled_requests(&mut resolver)
    };

    let rect = plan.rect();
    println!(
        "{} {} zoom {}: {} x {} tiles -> {}",
        spec.provider_name(),
        spec.mode_name(),
        area.zoom,
        rect.width(),
        rect.height(),
        output_dir.display()
    );
    info!(
        provider = spec.provider_name(),
        mode = spec.mode_name(),
        zoom = area.zoom,
        tiles = requests.len(),
        "Fetch planned"
    );

    let scheduler_config = download.scheduler_config(config);
    let identities = config
        .identity_pool()
        .map_err(|e| CliError::Config(format!("Failed to read user agents: {}", e)))?;
    let client = ReqwestClient::new(scheduler_config.request_timeout())?;

    let cancel = CancellationToken::new();
    install_interrupt_handler(cancel.clone())?;

    let bar = progress_bar(requests.len());
    let progress_bar_handle = bar.clone();

    let mut scheduler = FetchScheduler::new(client, scheduler_config)
        .with_identities(identities)
        .with_cancellation(cancel)
        .with_progress(move |progress: FetchProgress| {
            progress_bar_handle.set_position(progress.completed as u64);
            if progress.failed > 0 {
                progress_bar_handle.set_message(format!("{} failed", progress.failed));
            }
        });
    if let Some(seed) = download.seed {
        scheduler = scheduler.with_seed(seed);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let result = runtime.block_on(scheduler.run(requests));
    bar.finish_and_clear();
    let summary = result?;

    print_summary(&summary);
    Ok(summary)
}

/// Turn an incomplete batch into the matching error.
pub fn check_summary(summary: &FetchSummary) -> Result<(), CliError> {
    if summary.cancelled {
        return Err(CliError::Cancelled);
    }
    if summary.failed_count() > 0 {
        return Err(CliError::IncompleteFetch {
            failed: summary.failed_count(),
            total: summary.total,
        });
    }
    Ok(())
}

fn install_interrupt_handler(cancel: CancellationToken) -> Result<(), CliError> {
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Interrupted, finishing tiles in flight...");
        cancel.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tiles ({eta}) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn print_summary(summary: &FetchSummary) {
    println!(
        "Saved {}, skipped {} (already on disk), failed {} of {} tiles in {:.1}s",
        summary.saved,
        summary.skipped,
        summary.failed_count(),
        summary.total,
        summary.elapsed.as_secs_f64()
    );

    for failure in summary.failed.iter().take(MAX_LISTED_FAILURES) {
        println!(
            "  {}/{}/{}: {}",
            failure.tile.zoom, failure.tile.x, failure.tile.y, failure.reason
        );
    }
    if summary.failed_count() > MAX_LISTED_FAILURES {
        println!(
            "  ... and {} more (see log file)",
            summary.failed_count() - MAX_LISTED_FAILURES
        );
    }

    if summary.cancelled {
        warn!(completed = summary.completed(), total = summary.total, "Fetch cancelled");
        println!(
            "Cancelled after {} of {} tiles",
            summary.completed(),
            summary.total
        );
    }
}
