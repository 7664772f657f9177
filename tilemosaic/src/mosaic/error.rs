//! Mosaic assembly errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop mosaic assembly.
#[derive(Debug, Error)]
pub enum MosaicError {
    /// No tile in the directory matches the selected provider, mode and zoom
    #[error("No {provider} {mode} tiles at zoom {zoom} found in '{}'", dir.display())]
    EmptyGrid {
        dir: PathBuf,
        provider: &'static str,
        mode: &'static str,
        zoom: u8,
    },

    /// A decoded tile does not have the provider's tile size
    #[error(
        "Tile '{}' is {}x{}, expected {}x{}",
        path.display(), actual.0, actual.1, expected.0, expected.1
    )]
    InconsistentTileSize {
        path: PathBuf,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Filesystem failure while scanning, reading or writing
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The raster could not be encoded or a sentinel image decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl MosaicError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MosaicError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inconsistent_size_display() {
        let err = MosaicError::InconsistentTileSize {
            path: PathBuf::from("t/bing_satellite_2_2_1.jpeg"),
            expected: (256, 256),
            actual: (512, 512),
        };
        assert_eq!(
            err.to_string(),
            "Tile 't/bing_satellite_2_2_1.jpeg' is 512x512, expected 256x256"
        );
    }

    #[test]
    fn test_empty_grid_display() {
        let err = MosaicError::EmptyGrid {
            dir: PathBuf::from("tiles"),
            provider: "yandex",
            mode: "road",
            zoom: 12,
        };
        assert_eq!(
            err.to_string(),
            "No yandex road tiles at zoom 12 found in 'tiles'"
        );
    }
}
