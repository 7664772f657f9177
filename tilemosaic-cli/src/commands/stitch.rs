//! Stitch command - assemble downloaded tiles into one raster.

use std::path::{Path, PathBuf};
use std::process::Command;

use clap::Args;
use tilemosaic::config::ConfigFile;
use tilemosaic::mosaic::{GeoreferenceHandoff, MosaicAssembler};
use tilemosaic::provider::ProviderSpec;
use tracing::info;

use super::common::ProviderArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

const GDAL_TRANSLATE: &str = "gdal_translate";

/// Options for the assembled raster and its georeferencing.
#[derive(Args, Debug, Clone, Default)]
pub struct MosaicOptions {
    /// Reference "no data" tile; matching tiles become transparent
    /// (default from config)
    #[arg(long)]
    pub sentinel: Option<PathBuf>,

    /// Where to write the corner/SRS JSON (default: next to the mosaic)
    #[arg(long)]
    pub handoff: Option<PathBuf>,

    /// Also produce a GeoTIFF here with gdal_translate
    #[arg(long)]
    pub geotiff: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StitchArgs {
    /// Zoom level of the tiles to stitch
    #[arg(short, long)]
    pub zoom: u8,

    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Tile directory (default from config)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Mosaic image to write; the format follows the extension
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: MosaicOptions,
}

pub fn run(config_path: Option<&Path>, verbose: bool, args: StitchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose)?;
    runner.log_startup("stitch");

    let config = runner.config();
    let spec = args.provider.resolve(config)?;
    spec.check_zoom(args.zoom)?;

    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    stitch_directory(config, spec, args.zoom, &input, &args.output, &args.options)
}

/// Assemble `input` into `output`, then write the handoff and optional GeoTIFF.
pub fn stitch_directory(
    config: &ConfigFile,
    spec: ProviderSpec,
    zoom: u8,
    input: &Path,
    output: &Path,
    options: &MosaicOptions,
) -> Result<(), CliError> {
    let mut assembler = MosaicAssembler::new(spec, zoom);
    if let Some(sentinel) = options.sentinel.as_ref().or(config.output.sentinel.as_ref()) {
        assembler = assembler.with_sentinel_file(sentinel);
    }

    let mosaic = assembler.assemble(input)?;
    mosaic.save(output)?;
    println!(
        "Mosaic {} x {} px ({}) -> {}",
        mosaic.width(),
        mosaic.height(),
        mosaic.stats,
        output.display()
    );

    let handoff = mosaic.handoff(output);
    let handoff_path = options
        .handoff
        .clone()
        .unwrap_or_else(|| output.with_extension("json"));
    handoff.write_json(&handoff_path)?;
    println!(
        "Corners ({:.6}, {:.6}) - ({:.6}, {:.6}) {} -> {}",
        handoff.upper_left.0,
        handoff.upper_left.1,
        handoff.lower_right.0,
        handoff.lower_right.1,
        handoff.srs,
        handoff_path.display()
    );

    if let Some(geotiff) = &options.geotiff {
        georeference(&handoff, geotiff)?;
        println!("GeoTIFF -> {}", geotiff.display());
    }

    Ok(())
}

fn georeference(handoff: &GeoreferenceHandoff, geotiff: &Path) -> Result<(), CliError> {
    let args = handoff.gdal_translate_args(geotiff);
    info!(tool = GDAL_TRANSLATE, args = ?args, "Georeferencing mosaic");

    let output = Command::new(GDAL_TRANSLATE)
        .args(&args)
        .output()
        .map_err(|e| CliError::External {
            tool: GDAL_TRANSLATE.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CliError::External {
            tool: GDAL_TRANSLATE.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
