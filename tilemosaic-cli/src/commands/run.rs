//! Run command - fetch an area and stitch it in one go.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::warn;

use super::common::{AreaArgs, DownloadArgs, ProviderArgs};
use super::fetch::{check_summary, fetch_area};
use super::stitch::{stitch_directory, MosaicOptions};
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub area: AreaArgs,

    #[command(flatten)]
    pub provider: ProviderArgs,

    #[command(flatten)]
    pub download: DownloadArgs,

    /// Mosaic image to write; the format follows the extension
    #[arg(short, long)]
    pub mosaic: PathBuf,

    #[command(flatten)]
    pub options: MosaicOptions,
}

/// Fetch, then stitch whatever is on disk.
///
/// Failed tiles do not stop the stitch; they become transparent cells and
/// the command still exits non-zero so a rerun can fill them in. A
/// cancelled fetch skips the stitch.
pub fn run(config_path: Option<&Path>, verbose: bool, args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose)?;
    runner.log_startup("run");

    let config = runner.config();
    let spec = args.provider.resolve(config)?;
    let summary = fetch_area(config, spec, &args.area, &args.download)?;

    if summary.cancelled {
        return Err(CliError::Cancelled);
    }
    if summary.failed_count() > 0 {
        warn!(
            failed = summary.failed_count(),
            "Stitching with missing tiles"
        );
    }

    let tiles_dir = args.download.output_dir(config);
    stitch_directory(
        config,
        spec,
        args.area.zoom,
        &tiles_dir,
        &args.mosaic,
        &args.options,
    )?;

    check_summary(&summary)
}
