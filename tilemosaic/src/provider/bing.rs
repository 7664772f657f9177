//! Bing Maps imagery provider
//!
//! Bing addresses tiles by quadkey and spreads load over four shard hosts
//! (`a0`..`a3` for aerial, `t0`..`t3` for road). Any shard serves any tile.

use super::types::{ProviderSpec, TileProvider};
use crate::coord::{tile_to_quadkey, TileCoord};

const SATELLITE_URL: &str = "http://a{shard}.ortho.tiles.virtualearth.net/tiles/a{quadkey}.jpeg?g=94";

const ROAD_URL: &str = "http://ecn.dynamic.t{shard}.tiles.virtualearth.net/comp/CompositionHandler/r{quadkey}.jpeg?mkt=ru-ru&it=G,VE,BX,L,LA&shading=hill&g=94";

const SHARD_COUNT: u8 = 4;

/// Bing Maps provider for the aerial and road layers.
pub struct BingMapsProvider {
    spec: ProviderSpec,
    url_template: &'static str,
}

impl BingMapsProvider {
    /// Aerial imagery layer.
    pub fn satellite() -> Self {
        Self {
            spec: ProviderSpec::BingSatellite,
            url_template: SATELLITE_URL,
        }
    }

    /// Road map layer with hill shading.
    pub fn road() -> Self {
        Self {
            spec: ProviderSpec::BingRoad,
            url_template: ROAD_URL,
        }
    }
}

impl TileProvider for BingMapsProvider {
    fn spec(&self) -> ProviderSpec {
        self.spec
    }

    fn shard_count(&self) -> u8 {
        SHARD_COUNT
    }

    fn tile_url(&self, tile: &TileCoord, shard: u8) -> String {
        self.url_template
            .replace("{shard}", &(shard % SHARD_COUNT).to_string())
            .replace("{quadkey}", &tile_to_quadkey(tile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satellite_url_uses_quadkey_and_shard() {
        let provider = BingMapsProvider::satellite();
        let tile = TileCoord {
            x: 3,
            y: 5,
            zoom: 3,
        };

        assert_eq!(
            provider.tile_url(&tile, 2),
            "http://a2.ortho.tiles.virtualearth.net/tiles/a213.jpeg?g=94"
        );
    }

    #[test]
    fn test_road_url() {
        let provider = BingMapsProvider::road();
        let tile = TileCoord {
            x: 1,
            y: 0,
            zoom: 1,
        };

        let url = provider.tile_url(&tile, 0);
        assert!(url.starts_with("http://ecn.dynamic.t0.tiles.virtualearth.net/"));
        assert!(url.contains("/r1.jpeg?"));
        assert!(url.contains("shading=hill"));
    }

    #[test]
    fn test_shard_is_wrapped_into_range() {
        let provider = BingMapsProvider::satellite();
        let tile = TileCoord {
            x: 0,
            y: 0,
            zoom: 1,
        };

        assert!(provider.tile_url(&tile, 5).starts_with("http://a1."));
        assert_eq!(provider.shard_count(), 4);
    }

    #[test]
    fn test_spec_and_headers() {
        assert_eq!(BingMapsProvider::road().spec(), ProviderSpec::BingRoad);
        let headers = BingMapsProvider::satellite().headers();
        assert_eq!(headers, vec![("Pragma".to_string(), "no-cache".to_string())]);
    }
}
