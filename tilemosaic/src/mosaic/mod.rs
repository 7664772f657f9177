//! Mosaic assembly
//!
//! Reads the tiles a fetch run left in a directory and stitches them into one
//! raster:
//!
//! 1. Scan the directory for files of the selected provider, mode and zoom.
//!    The occupied index range defines the grid.
//! 2. Decode every present cell in parallel. Missing, undecodable and
//!    no-data tiles become transparent placeholders of the provider's tile
//!    size.
//! 3. Reject any decoded tile whose size differs from the provider's.
//! 4. Stack each column top to bottom, then the columns left to right.
//! 5. Compute the outer corners from the extreme tiles.
//!
//! The result can be saved and handed to `gdal_translate` for
//! georeferencing via [`GeoreferenceHandoff`].

mod assembler;
mod concat;
mod error;
mod georef;
mod grid;
mod sentinel;

pub use assembler::{AssemblyStats, Mosaic, MosaicAssembler};
pub use concat::{concat, Axis};
pub use error::MosaicError;
pub use georef::GeoreferenceHandoff;
pub use grid::TileGrid;
pub use sentinel::NoDataSentinel;
