//! Hand-off to the external georeferencing tool.
//!
//! The mosaic itself is a plain raster. Placing it on the map takes the
//! projected coordinates of its outer corners and the spatial reference;
//! `gdal_translate -a_ullr` consumes exactly that.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::MosaicError;
use crate::coord::GeoPoint;
use crate::provider::SpatialReference;

/// Raster location plus the affine corner points in projected meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoreferenceHandoff {
    pub raster: PathBuf,
    /// `(x, y)` of the upper-left corner in meters
    pub upper_left: (f64, f64),
    /// `(x, y)` of the lower-right corner in meters
    pub lower_right: (f64, f64),
    /// Authority code, e.g. `EPSG:3857`
    pub srs: String,
}

impl GeoreferenceHandoff {
    pub fn new(
        raster: impl Into<PathBuf>,
        top_left: &GeoPoint,
        bottom_right: &GeoPoint,
        srs: SpatialReference,
    ) -> Self {
        Self {
            raster: raster.into(),
            upper_left: top_left.to_web_mercator(),
            lower_right: bottom_right.to_web_mercator(),
            srs: srs.code().to_string(),
        }
    }

    /// Writes the hand-off as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), MosaicError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MosaicError::io(path, std::io::Error::from(e)))?;
        std::fs::write(path, json).map_err(|e| MosaicError::io(path, e))
    }

    /// Reads a hand-off written by [`write_json`](Self::write_json).
    pub fn read_json(path: &Path) -> Result<Self, MosaicError> {
        let content = std::fs::read_to_string(path).map_err(|e| MosaicError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| MosaicError::io(path, std::io::Error::from(e)))
    }

    /// Arguments for `gdal_translate` producing a georeferenced BigTIFF.
    pub fn gdal_translate_args(&self, output: &Path) -> Vec<String> {
        vec![
            "-of".to_string(),
            "GTiff".to_string(),
            "-co".to_string(),
            "BIGTIFF=YES".to_string(),
            "-a_ullr".to_string(),
            self.upper_left.0.to_string(),
            self.upper_left.1.to_string(),
            self.lower_right.0.to_string(),
            self.lower_right.1.to_string(),
            "-a_srs".to_string(),
            self.srs.clone(),
            self.raster.display().to_string(),
            output.display().to_string(),
        ]
    }
}
