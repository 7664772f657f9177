//! Yandex Maps provider
//!
//! Yandex serves plain x/y/z tiles but bans clients that request them in
//! quick succession, so both layers are flagged as rate limited and the
//! scheduler spaces their requests out.

use super::types::{ProviderSpec, TileProvider};
use crate::coord::TileCoord;

const SATELLITE_URL: &str =
    "https://core-sat.maps.yandex.net/tiles?l=sat&v=3.564.0&x={x}&y={y}&z={z}&scale=1&lang=ru_RU";

const ROAD_URL: &str =
    "https://vec02.maps.yandex.net/tiles?l=map&v=17.08.08-0&x={x}&y={y}&z={z}&scale=1&lang=ru_RU";

/// Yandex satellite and road layers.
pub struct YandexMapsProvider {
    spec: ProviderSpec,
    url_template: &'static str,
}

impl YandexMapsProvider {
    pub fn satellite() -> Self {
        Self {
            spec: ProviderSpec::YandexSatellite,
            url_template: SATELLITE_URL,
        }
    }

    pub fn road() -> Self {
        Self {
            spec: ProviderSpec::YandexRoad,
            url_template: ROAD_URL,
        }
    }
}

impl TileProvider for YandexMapsProvider {
    fn spec(&self) -> ProviderSpec {
        self.spec
    }

    fn tile_url(&self, tile: &TileCoord, _shard: u8) -> String {
        self.url_template
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{z}", &tile.zoom.to_string())
    }
}
