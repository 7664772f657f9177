//! Provider types and traits

use std::fmt;

use crate::coord::{TileCoord, MAX_ZOOM};

/// Errors raised while selecting or configuring a provider.
///
/// All of these are configuration errors: they surface before any network
/// activity takes place.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Provider name is not one of the known providers
    UnknownProvider(String),
    /// Provider exists but does not serve the requested mode
    UnsupportedMode {
        provider: String,
        mode: String,
        supported: &'static [&'static str],
    },
    /// Zoom level not supported by this provider
    UnsupportedZoom { provider: ProviderSpec, zoom: u8 },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::UnknownProvider(name) => write!(
                f,
                "Unknown provider '{}' (expected one of: {})",
                name,
                PROVIDER_NAMES.join(", ")
            ),
            ProviderError::UnsupportedMode {
                provider,
                mode,
                supported,
            } => write!(
                f,
                "Provider '{}' does not support mode '{}' (supported: {})",
                provider,
                mode,
                supported.join(", ")
            ),
            ProviderError::UnsupportedZoom { provider, zoom } => write!(
                f,
                "Zoom level {} not supported by {} (range {}..={})",
                zoom,
                provider,
                provider.min_zoom(),
                provider.max_zoom()
            ),
        }
    }
}

impl std::error::Error for ProviderError {}

const PROVIDER_NAMES: &[&str] = &["bing", "yandex", "pkk"];
const BING_MODES: &[&str] = &["satellite", "road"];
const YANDEX_MODES: &[&str] = &["satellite", "road"];
const PKK_MODES: &[&str] = &["cadastre", "thematic"];

/// Map service queried by the cadastral export provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CadastreLayer {
    /// Parcel boundaries ("CadastreSelected" map service)
    Cadastre,
    /// Thematic overlays ("Thematic" map service)
    Thematic,
}

/// How a provider addresses imagery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    /// Pre-cut tiles addressed by x/y/zoom or quadkey
    Xyz,
    /// Server renders an arbitrary bounding box at a requested pixel size
    Export,
}

/// Spatial reference handed to the georeferencing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialReference {
    /// EPSG:3857, spherical Web Mercator
    WebMercator,
    /// ESRI:102100, the ArcGIS identifier for the same projection
    EsriWebMercator,
}

impl SpatialReference {
    /// Authority-qualified code, e.g. `EPSG:3857`.
    pub fn code(&self) -> &'static str {
        match self {
            SpatialReference::WebMercator => "EPSG:3857",
            SpatialReference::EsriWebMercator => "ESRI:102100",
        }
    }

    /// Numeric identifier.
    pub fn srid(&self) -> u32 {
        match self {
            SpatialReference::WebMercator => 3857,
            SpatialReference::EsriWebMercator => 102100,
        }
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Closed set of supported (provider, mode) combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderSpec {
    BingSatellite,
    BingRoad,
    YandexSatellite,
    YandexRoad,
    CadastreExport(CadastreLayer),
}

impl ProviderSpec {
    /// Every supported combination.
    pub const ALL: [ProviderSpec; 6] = [
        ProviderSpec::BingSatellite,
        ProviderSpec::BingRoad,
        ProviderSpec::YandexSatellite,
        ProviderSpec::YandexRoad,
        ProviderSpec::CadastreExport(CadastreLayer::Cadastre),
        ProviderSpec::CadastreExport(CadastreLayer::Thematic),
    ];

    /// Resolves user-facing provider and mode names.
    ///
    /// Matching is case-insensitive. `map` is accepted as an alias for the
    /// Yandex road layer.
    pub fn from_names(provider: &str, mode: &str) -> Result<Self, ProviderError> {
        let provider = provider.trim().to_lowercase();
        let mode = mode.trim().to_lowercase();

        let unsupported = |supported| ProviderError::UnsupportedMode {
            provider: provider.clone(),
            mode: mode.clone(),
            supported,
        };

        match provider.as_str() {
            "bing" => match mode.as_str() {
                "satellite" => Ok(ProviderSpec::BingSatellite),
                "road" => Ok(ProviderSpec::BingRoad),
                _ => Err(unsupported(BING_MODES)),
            },
            "yandex" => match mode.as_str() {
                "satellite" => Ok(ProviderSpec::YandexSatellite),
                "road" | "map" => Ok(ProviderSpec::YandexRoad),
                _ => Err(unsupported(YANDEX_MODES)),
            },
            "pkk" => match mode.as_str() {
                "cadastre" => Ok(ProviderSpec::CadastreExport(CadastreLayer::Cadastre)),
                "thematic" => Ok(ProviderSpec::CadastreExport(CadastreLayer::Thematic)),
                _ => Err(unsupported(PKK_MODES)),
            },
            _ => Err(ProviderError::UnknownProvider(provider.clone())),
        }
    }

    /// Provider token used in filenames.
    pub fn provider_name(&self) -> &'static str {
        match self {
            ProviderSpec::BingSatellite | ProviderSpec::BingRoad => "bing",
            ProviderSpec::YandexSatellite | ProviderSpec::YandexRoad => "yandex",
            ProviderSpec::CadastreExport(_) => "pkk",
        }
    }

    /// Mode token used in filenames.
    pub fn mode_name(&self) -> &'static str {
        match self {
            ProviderSpec::BingSatellite | ProviderSpec::YandexSatellite => "satellite",
            ProviderSpec::BingRoad | ProviderSpec::YandexRoad => "road",
            ProviderSpec::CadastreExport(CadastreLayer::Cadastre) => "cadastre",
            ProviderSpec::CadastreExport(CadastreLayer::Thematic) => "thematic",
        }
    }

    pub fn family(&self) -> ProviderFamily {
        match self {
            ProviderSpec::CadastreExport(_) => ProviderFamily::Export,
            _ => ProviderFamily::Xyz,
        }
    }

    /// File extension of stored tiles.
    pub fn extension(&self) -> &'static str {
        match self {
            ProviderSpec::BingSatellite | ProviderSpec::BingRoad => "jpeg",
            ProviderSpec::YandexSatellite => "jpeg",
            ProviderSpec::YandexRoad => "png",
            ProviderSpec::CadastreExport(_) => "png",
        }
    }

    /// Edge length of one tile in pixels.
    pub fn tile_size(&self) -> u32 {
        match self.family() {
            ProviderFamily::Xyz => 256,
            ProviderFamily::Export => 1024,
        }
    }

    /// Whether the provider throttles aggressive clients and needs a pause
    /// between requests.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderSpec::YandexSatellite | ProviderSpec::YandexRoad)
    }

    pub fn spatial_reference(&self) -> SpatialReference {
        match self.family() {
            ProviderFamily::Xyz => SpatialReference::WebMercator,
            ProviderFamily::Export => SpatialReference::EsriWebMercator,
        }
    }

    pub fn min_zoom(&self) -> u8 {
        match self {
            // A zoom 0 quadkey is empty, which Bing rejects.
            ProviderSpec::BingSatellite | ProviderSpec::BingRoad => 1,
            _ => 0,
        }
    }

    pub fn max_zoom(&self) -> u8 {
        match self {
            ProviderSpec::BingSatellite | ProviderSpec::BingRoad => 20,
            ProviderSpec::YandexSatellite | ProviderSpec::YandexRoad => 19,
            ProviderSpec::CadastreExport(_) => MAX_ZOOM,
        }
    }

    pub fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom() && zoom <= self.max_zoom()
    }

    /// Returns an error unless `zoom` is within this provider's range.
    pub fn check_zoom(&self, zoom: u8) -> Result<(), ProviderError> {
        if self.supports_zoom(zoom) {
            Ok(())
        } else {
            Err(ProviderError::UnsupportedZoom {
                provider: *self,
                zoom,
            })
        }
    }
}

impl fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.provider_name(), self.mode_name())
    }
}

/// A source of tile URLs.
///
/// Implementors know how to address one (provider, mode) combination. They
/// never perform I/O; the fetch scheduler owns the network.
pub trait TileProvider: Send + Sync {
    /// The combination this provider serves.
    fn spec(&self) -> ProviderSpec;

    /// Number of interchangeable shard hosts; the resolver picks one at random.
    fn shard_count(&self) -> u8 {
        1
    }

    /// Builds the request URL for a tile on the given shard.
    fn tile_url(&self, tile: &TileCoord, shard: u8) -> String;

    /// Extra request headers beyond the rotated user agent.
    fn headers(&self) -> Vec<(String, String)> {
        vec![("Pragma".to_string(), "no-cache".to_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_names_all_combinations() {
        for spec in ProviderSpec::ALL {
            let parsed = ProviderSpec::from_names(spec.provider_name(), spec.mode_name()).unwrap();
            assert_eq!(parsed, spec);
        }
    }

    #[test]
    fn test_from_names_is_case_insensitive() {
        assert_eq!(
            ProviderSpec::from_names(" Bing ", "SATELLITE"),
            Ok(ProviderSpec::BingSatellite)
        );
    }

    #[test]
    fn test_yandex_map_alias() {
        assert_eq!(
            ProviderSpec::from_names("yandex", "map"),
            Ok(ProviderSpec::YandexRoad)
        );
    }

    #[test]
    fn test_unknown_provider() {
        assert_eq!(
            ProviderSpec::from_names("google", "satellite"),
            Err(ProviderError::UnknownProvider("google".to_string()))
        );
    }

    #[test]
    fn test_unsupported_mode() {
        let err = ProviderSpec::from_names("bing", "cadastre").unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedMode { .. }));
        let message = err.to_string();
        assert!(message.contains("cadastre"));
        assert!(message.contains("satellite, road"));

        assert!(ProviderSpec::from_names("pkk", "satellite").is_err());
    }

    #[test]
    fn test_tile_size_is_provider_metadata() {
        assert_eq!(ProviderSpec::BingSatellite.tile_size(), 256);
        assert_eq!(ProviderSpec::YandexRoad.tile_size(), 256);
        assert_eq!(
            ProviderSpec::CadastreExport(CadastreLayer::Thematic).tile_size(),
            1024
        );
    }

    #[test]
    fn test_only_yandex_is_rate_limited() {
        let limited: Vec<_> = ProviderSpec::ALL
            .iter()
            .filter(|s| s.is_rate_limited())
            .map(|s| s.provider_name())
            .collect();
        assert_eq!(limited, vec!["yandex", "yandex"]);
    }

    #[test]
    fn test_spatial_reference_by_family() {
        assert_eq!(ProviderSpec::BingRoad.spatial_reference().code(), "EPSG:3857");
        assert_eq!(ProviderSpec::YandexSatellite.spatial_reference().srid(), 3857);
        assert_eq!(
            ProviderSpec::CadastreExport(CadastreLayer::Cadastre)
                .spatial_reference()
                .code(),
            "ESRI:102100"
        );
    }

    #[test]
    fn test_check_zoom() {
        assert!(ProviderSpec::BingSatellite.check_zoom(0).is_err());
        assert!(ProviderSpec::BingSatellite.check_zoom(2).is_ok());
        assert!(ProviderSpec::YandexRoad.check_zoom(20).is_err());

        let err = ProviderSpec::BingRoad.check_zoom(21).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Zoom level 21 not supported by bing road (range 1..=20)"
        );
    }
}
