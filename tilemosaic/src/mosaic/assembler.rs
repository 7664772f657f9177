//! Mosaic assembly.

use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::concat::{concat, Axis};
use super::error::MosaicError;
use super::georef::GeoreferenceHandoff;
use super::grid::TileGrid;
use super::sentinel::NoDataSentinel;
use crate::coord::{tile_bounds, GeoPoint, TileCoord};
use crate::provider::{ProviderSpec, SpatialReference};

/// What ended up in each grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub columns: u32,
    pub rows: u32,
    /// Cells filled with decoded imagery
    pub placed: usize,
    /// Cells without a file
    pub missing: usize,
    /// Cells whose tile matched the no-data sentinel
    pub no_data: usize,
    /// Cells whose file could not be decoded
    pub undecodable: usize,
}

impl AssemblyStats {
    pub fn placeholders(&self) -> usize {
        self.missing + self.no_data + self.undecodable
    }
}

impl fmt::Display for AssemblyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} tiles: {} placed, {} missing, {} no-data, {} undecodable",
            self.columns, self.rows, self.placed, self.missing, self.no_data, self.undecodable
        )
    }
}

/// A stitched raster with its geographic extent.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub raster: RgbaImage,
    /// Top-left tile of the grid
    pub origin: TileCoord,
    /// North-west corner of the raster
    pub top_left: GeoPoint,
    /// South-east corner of the raster
    pub bottom_right: GeoPoint,
    pub spatial_reference: SpatialReference,
    pub stats: AssemblyStats,
}

impl Mosaic {
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Writes the raster; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<(), MosaicError> {
        self.raster.save(path)?;
        info!(path = %path.display(), width = self.width(), height = self.height(), "Mosaic saved");
        Ok(())
    }

    /// Georeferencing data for the raster stored at `raster_path`.
    pub fn handoff(&self, raster_path: impl Into<PathBuf>) -> GeoreferenceHandoff {
        GeoreferenceHandoff::new(
            raster_path,
            &self.top_left,
            &self.bottom_right,
            self.spatial_reference,
        )
    }
}

enum Cell {
    Tile(RgbaImage),
    Missing,
    NoData,
    Undecodable,
}

/// Stitches the tiles of one provider and zoom level from a directory.
pub struct MosaicAssembler {
    spec: ProviderSpec,
    zoom: u8,
    sentinel: Option<NoDataSentinel>,
}

impl MosaicAssembler {
    pub fn new(spec: ProviderSpec, zoom: u8) -> Self {
        Self {
            spec,
            zoom,
            sentinel: None,
        }
    }

    /// Replaces tiles identical to `sentinel` with placeholders.
    pub fn with_sentinel(mut self, sentinel: NoDataSentinel) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    /// Loads the no-data sentinel from an image file.
    ///
    /// An unreadable sentinel disables detection with a warning.
    pub fn with_sentinel_file(mut self, path: &Path) -> Self {
        match NoDataSentinel::load(path) {
            Ok(sentinel) => self.sentinel = Some(sentinel),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "No-data sentinel unavailable, detection disabled");
                self.sentinel = None;
            }
        }
        self
    }

    pub fn has_sentinel(&self) -> bool {
        self.sentinel.is_some()
    }

    /// Scans `dir` and stitches every matching tile.
    pub fn assemble(&self, dir: &Path) -> Result<Mosaic, MosaicError> {
        let grid = TileGrid::scan(dir, self.spec, self.zoom)?;
        self.assemble_grid(&grid)
    }

    /// Stitches an already scanned grid.
    pub fn assemble_grid(&self, grid: &TileGrid) -> Result<Mosaic, MosaicError> {
        let rect = *grid.rect();
        let tile_size = self.spec.tile_size();

        let slots: Vec<(TileCoord, Option<PathBuf>)> = grid
            .cells()
            .map(|(tile, path)| (tile, path.map(Path::to_path_buf)))
            .collect();

        // Decode in parallel; collect keeps column-major order.
        let cells: Vec<Cell> = slots
            .par_iter()
            .map(|(tile, path)| self.classify(tile, path.as_deref()))
            .collect();

        let mut stats = AssemblyStats {
            columns: rect.width(),
            rows: rect.height(),
            ..Default::default()
        };
        for ((_, path), cell) in slots.iter().zip(&cells) {
            match cell {
                Cell::Tile(image) => {
                    if image.dimensions() != (tile_size, tile_size) {
                        return Err(MosaicError::InconsistentTileSize {
                            path: path.clone().unwrap_or_default(),
                            expected: (tile_size, tile_size),
                            actual: image.dimensions(),
                        });
                    }
                    stats.placed += 1;
                }
                Cell::Missing => stats.missing += 1,
                Cell::NoData => stats.no_data += 1,
                Cell::Undecodable => stats.undecodable += 1,
            }
        }

        let rows = rect.height() as usize;
        let mut images: Vec<RgbaImage> = cells
            .into_iter()
            .map(|cell| match cell {
                Cell::Tile(image) => image,
                _ => placeholder(tile_size),
            })
            .collect();

        let mut columns = Vec::with_capacity(rect.width() as usize);
        while !images.is_empty() {
            let rest = images.split_off(rows.min(images.len()));
            columns.push(concat(&images, Axis::Vertical));
            images = rest;
        }
        let raster = concat(&columns, Axis::Horizontal);

        let (top_left, _) = tile_bounds(&rect.top_left());
        let (_, bottom_right) = tile_bounds(&rect.bottom_right());

        info!(
            spec = %self.spec,
            zoom = self.zoom,
            width = raster.width(),
            height = raster.height(),
            placed = stats.placed,
            placeholders = stats.placeholders(),
            "Mosaic assembled"
        );

        Ok(Mosaic {
            raster,
            origin: rect.top_left(),
            top_left,
            bottom_right,
            spatial_reference: self.spec.spatial_reference(),
            stats,
        })
    }

    fn classify(&self, tile: &TileCoord, path: Option<&Path>) -> Cell {
        let Some(path) = path else {
            debug!(tile = %tile, "Tile missing, using placeholder");
            return Cell::Missing;
        };

        let image = match decode(path) {
            Ok(image) => image,
            Err(e) => {
                warn!(tile = %tile, path = %path.display(), error = %e, "Failed to decode tile, using placeholder");
                return Cell::Undecodable;
            }
        };

        if self.sentinel.as_ref().is_some_and(|s| s.matches(&image)) {
            debug!(tile = %tile, "No-data tile, using placeholder");
            return Cell::NoData;
        }

        Cell::Tile(image)
    }
}

fn decode(path: &Path) -> Result<RgbaImage, MosaicError> {
    let bytes = std::fs::read(path).map_err(|e| MosaicError::io(path, e))?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Fully transparent tile.
fn placeholder(size: u32) -> RgbaImage {
    RgbaImage::new(size, size)
}
