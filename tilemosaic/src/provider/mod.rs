//! Tile provider abstraction
//!
//! A provider turns a tile index into a URL. The closed set of supported
//! (provider, mode) pairs is [`ProviderSpec`]; each carries its own metadata
//! (zoom range, file extension, tile size, rate limiting, spatial reference).
//!
//! # Resolving requests
//!
//! ```ignore
//! use tilemosaic::provider::{ProviderResolver, ProviderSpec};
//!
//! let spec = ProviderSpec::from_names("bing", "satellite")?;
//! let mut resolver = ProviderResolver::new(spec, "./tiles");
//! let request = resolver.resolve(&tile);
//! ```

mod bing;
mod cadastre;
mod resolver;
mod types;
mod yandex;

pub use bing::BingMapsProvider;
pub use cadastre::CadastreExportProvider;
pub use resolver::{create_provider, ProviderResolver};
pub use types::{
    CadastreLayer, ProviderError, ProviderFamily, ProviderSpec, SpatialReference, TileProvider,
};
pub use yandex::YandexMapsProvider;
