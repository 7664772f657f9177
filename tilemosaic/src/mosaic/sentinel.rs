//! No-data tile detection.
//!
//! Providers answer requests outside their coverage with a fixed "no imagery"
//! tile. Such tiles are recognised by a SHA-256 digest of their RGBA pixels
//! and replaced with a transparent placeholder during assembly.
//!
//! Matching is exact: a provider that re-encodes its no-data tile, or serves
//! a variant with different text, will not be detected.

use image::RgbaImage;
use sha2::{Digest, Sha256};
use std::path::Path;

use super::error::MosaicError;

/// Fingerprint of a provider's no-data tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoDataSentinel {
    width: u32,
    height: u32,
    digest: [u8; 32],
}

impl NoDataSentinel {
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            digest: pixel_digest(image),
        }
    }

    /// Loads and fingerprints a sentinel image file.
    pub fn load(path: &Path) -> Result<Self, MosaicError> {
        let bytes = std::fs::read(path).map_err(|e| MosaicError::io(path, e))?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        Ok(Self::from_image(&image))
    }

    /// True when `image` is pixel-identical to the sentinel.
    pub fn matches(&self, image: &RgbaImage) -> bool {
        image.dimensions() == (self.width, self.height) && pixel_digest(image) == self.digest
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn pixel_digest(image: &RgbaImage) -> [u8; 32] {
    Sha256::digest(image.as_raw()).into()
}
