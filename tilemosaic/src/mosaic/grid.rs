//! Tiles found on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::MosaicError;
use crate::coord::{TileCoord, TileRect};
use crate::naming::parse_tile_filename;
use crate::provider::ProviderSpec;

/// Tile files of one provider, mode and zoom, indexed by `(x, y)`.
///
/// The grid spans the occupied range in both directions; cells inside that
/// range without a file are gaps.
#[derive(Debug, Clone)]
pub struct TileGrid {
    spec: ProviderSpec,
    rect: TileRect,
    cells: BTreeMap<(u32, u32), PathBuf>,
}

impl TileGrid {
    /// Scans `dir` for matching tile files.
    ///
    /// Files that do not follow the naming convention, belong to another
    /// provider, mode or zoom, carry a different extension than the provider
    /// stores, or name a tile outside the zoom level's grid are ignored.
    pub fn scan(dir: &Path, spec: ProviderSpec, zoom: u8) -> Result<Self, MosaicError> {
        let entries = std::fs::read_dir(dir).map_err(|e| MosaicError::io(dir, e))?;

        let mut cells = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| MosaicError::io(dir, e))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Ok(parsed) = parse_tile_filename(name) else {
                continue;
            };
            if !parsed.matches(spec.provider_name(), spec.mode_name(), zoom) {
                continue;
            }
            if parsed.extension != spec.extension() {
                debug!(file = name, expected = spec.extension(), "Skipping tile with foreign extension");
                continue;
            }
            let tile = match TileCoord::new(parsed.x, parsed.y, zoom) {
                Ok(tile) => tile,
                Err(e) => {
                    debug!(file = name, error = %e, "Skipping tile outside the grid");
                    continue;
                }
            };
            if !entry.path().is_file() {
                continue;
            }
            cells.insert((tile.x, tile.y), entry.path());
        }

        let Some(rect) = occupied_rect(&cells, zoom) else {
            return Err(MosaicError::EmptyGrid {
                dir: dir.to_path_buf(),
                provider: spec.provider_name(),
                mode: spec.mode_name(),
                zoom,
            });
        };

        debug!(
            dir = %dir.display(),
            tiles = cells.len(),
            columns = rect.width(),
            rows = rect.height(),
            "Scanned tile grid"
        );

        Ok(Self { spec, rect, cells })
    }

    pub fn spec(&self) -> ProviderSpec {
        self.spec
    }

    /// Occupied range.
    pub fn rect(&self) -> &TileRect {
        &self.rect
    }

    /// Number of files present.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Path> {
        self.cells.get(&(x, y)).map(PathBuf::as_path)
    }

    /// Every cell of the range in column-major order, with its file if any.
    pub fn cells(&self) -> impl Iterator<Item = (TileCoord, Option<&Path>)> + '_ {
        self.rect
            .tiles()
            .map(move |tile| (tile, self.get(tile.x, tile.y)))
    }
}

fn occupied_rect(cells: &BTreeMap<(u32, u32), PathBuf>, zoom: u8) -> Option<TileRect> {
    let mut keys = cells.keys();
    let &(x0, y0) = keys.next()?;
    let rect = keys.fold(
        TileRect {
            x_min: x0,
            x_max: x0,
            y_min: y0,
            y_max: y0,
            zoom,
        },
        |mut r, &(x, y)| {
            r.x_min = r.x_min.min(x);
            r.x_max = r.x_max.max(x);
            r.y_min = r.y_min.min(y);
            r.y_max = r.y_max.max(y);
            r
        },
    );
    Some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CadastreLayer;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_scan_collects_matching_tiles() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "bing_satellite_5_10_20.jpeg");
        touch(dir.path(), "bing_satellite_5_12_21.jpeg");

        let grid = TileGrid::scan(dir.path(), ProviderSpec::BingSatellite, 5).unwrap();

        assert_eq!(grid.len(), 2);
        assert_eq!(
            *grid.rect(),
            TileRect {
                x_min: 10,
                x_max: 12,
                y_min: 20,
                y_max: 21,
                zoom: 5
            }
        );
        assert!(grid.get(10, 20).is_some());
        assert!(grid.get(11, 20).is_none());
    }

    #[test]
    fn test_scan_ignores_other_selections_and_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "bing_satellite_5_10_20.jpeg");
        touch(dir.path(), "bing_satellite_6_99_99.jpeg");
        touch(dir.path(), "bing_road_5_0_0.jpeg");
        touch(dir.path(), "yandex_satellite_5_1_1.jpeg");
        touch(dir.path(), "bing_satellite_5_30_30.jpeg.part");
        touch(dir.path(), "notes.txt");
        std::fs::create_dir(dir.path().join("bing_satellite_5_40_40.jpeg")).unwrap();

        let grid = TileGrid::scan(dir.path(), ProviderSpec::BingSatellite, 5).unwrap();

        assert_eq!(grid.len(), 1);
        assert_eq!(grid.rect().tile_count(), 1);
    }

    #[test]
    fn test_scan_skips_indices_outside_zoom_grid() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "bing_satellite_2_2_1.jpeg");
        touch(dir.path(), "bing_satellite_2_9_9.jpeg");
        touch(dir.path(), "bing_satellite_2_4_0.jpeg");

        let grid = TileGrid::scan(dir.path(), ProviderSpec::BingSatellite, 2).unwrap();

        assert_eq!(grid.len(), 1);
        assert_eq!(
            *grid.rect(),
            TileRect {
                x_min: 2,
                x_max: 2,
                y_min: 1,
                y_max: 1,
                zoom: 2
            }
        );
        let (_, se) = crate::coord::tile_bounds(&grid.rect().bottom_right());
        assert!(se.lon <= 180.0);
    }

    #[test]
    fn test_scan_skips_foreign_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "bing_satellite_2_2_1.jpeg");
        touch(dir.path(), "bing_satellite_2_2_1.png");
        touch(dir.path(), "bing_satellite_2_3_1.tif");

        let grid = TileGrid::scan(dir.path(), ProviderSpec::BingSatellite, 2).unwrap();

        assert_eq!(grid.len(), 1);
        assert_eq!(grid.rect().width(), 1);
        assert_eq!(
            grid.get(2, 1),
            Some(dir.path().join("bing_satellite_2_2_1.jpeg").as_path())
        );
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "bing_satellite_5_10_20.jpeg");

        let err = TileGrid::scan(
            dir.path(),
            ProviderSpec::CadastreExport(CadastreLayer::Cadastre),
            5,
        )
        .unwrap_err();

        assert!(matches!(err, MosaicError::EmptyGrid { zoom: 5, .. }));
    }

    #[test]
    fn test_scan_missing_directory_is_io_error() {
        let err = TileGrid::scan(
            Path::new("/nonexistent/tilemosaic"),
            ProviderSpec::BingSatellite,
            5,
        )
        .unwrap_err();
        assert!(matches!(err, MosaicError::Io { .. }));
    }

    #[test]
    fn test_cells_are_column_major_with_gaps() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "bing_road_3_1_1.jpeg");
        touch(dir.path(), "bing_road_3_2_2.jpeg");

        let grid = TileGrid::scan(dir.path(), ProviderSpec::BingRoad, 3).unwrap();
        let cells: Vec<_> = grid
            .cells()
            .map(|(t, p)| ((t.x, t.y), p.is_some()))
            .collect();

        assert_eq!(
            cells,
            vec![
                ((1, 1), true),
                ((1, 2), false),
                ((2, 1), false),
                ((2, 2), true)
            ]
        );
    }
}
