//! Turns tile indices into download requests.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::bing::BingMapsProvider;
use super::cadastre::CadastreExportProvider;
use super::types::{ProviderError, ProviderSpec, TileProvider};
use super::yandex::YandexMapsProvider;
use crate::coord::TileCoord;
use crate::fetch::FetchRequest;
use crate::naming::TileFileName;

/// Creates the provider implementation for a spec.
pub fn create_provider(spec: ProviderSpec) -> Box<dyn TileProvider> {
    match spec {
        ProviderSpec::BingSatellite => Box::new(BingMapsProvider::satellite()),
        ProviderSpec::BingRoad => Box::new(BingMapsProvider::road()),
        ProviderSpec::YandexSatellite => Box::new(YandexMapsProvider::satellite()),
        ProviderSpec::YandexRoad => Box::new(YandexMapsProvider::road()),
        ProviderSpec::CadastreExport(layer) => Box::new(CadastreExportProvider::new(layer)),
    }
}

/// Resolves tiles of one provider into [`FetchRequest`]s.
///
/// The resolver owns the random source used for shard selection and for
/// shuffling download order, so a seeded resolver yields reproducible URLs
/// and orderings.
pub struct ProviderResolver {
    provider: Box<dyn TileProvider>,
    output_dir: PathBuf,
    rng: StdRng,
}

impl ProviderResolver {
    /// Creates a resolver storing tiles under `output_dir`.
    pub fn new(spec: ProviderSpec, output_dir: impl Into<PathBuf>) -> Self {
        Self::with_provider(create_provider(spec), output_dir, StdRng::from_os_rng())
    }

    /// Creates a resolver with a deterministic random source.
    pub fn with_seed(spec: ProviderSpec, output_dir: impl Into<PathBuf>, seed: u64) -> Self {
        Self::with_provider(
            create_provider(spec),
            output_dir,
            StdRng::seed_from_u64(seed),
        )
    }

    /// Creates a resolver around a custom provider implementation.
    pub fn with_provider(
        provider: Box<dyn TileProvider>,
        output_dir: impl Into<PathBuf>,
        rng: StdRng,
    ) -> Self {
        Self {
            provider,
            output_dir: output_dir.into(),
            rng,
        }
    }

    pub fn spec(&self) -> ProviderSpec {
        self.provider.spec()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fails when the provider does not serve `zoom`.
    pub fn check_zoom(&self, zoom: u8) -> Result<(), ProviderError> {
        self.spec().check_zoom(zoom)
    }

    /// Random source shared with request planning.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Path a tile is stored at; also the dedup key.
    pub fn destination(&self, tile: &TileCoord) -> PathBuf {
        let spec = self.spec();
        let name = TileFileName::new(
            spec.provider_name(),
            spec.mode_name(),
            tile,
            spec.extension(),
        );
        self.output_dir.join(name.to_string())
    }

    /// Builds the request for one tile, picking a random shard.
    pub fn resolve(&mut self, tile: &TileCoord) -> FetchRequest {
        let shards = self.provider.shard_count().max(1);
        let shard = self.rng.random_range(0..shards);
        let url = self.provider.tile_url(tile, shard);
        debug!(tile = %tile, shard, url = %url, "Resolved tile");

        FetchRequest {
            tile: *tile,
            spec: self.spec(),
            url,
            destination: self.destination(tile),
            headers: self.provider.headers(),
        }
    }
}
