//! Public cadastral map (PKK) export provider.
//!
//! Unlike the xyz providers, the cadastral map is an ArcGIS `MapServer/export`
//! endpoint: it renders any bounding box at a requested pixel size. Each tile
//! index is turned into its Web Mercator bounds and requested as one
//! 1024×1024 transparent PNG, so the stored tiles still line up on the
//! slippy grid.
//!
//! # Request parameters
//!
//! - `bbox=xmin,ymin,xmax,ymax` in meters, `bboxSR=imageSR=102100`
//! - `size=1024,1024`, `dpi=96`, `format=PNG32`, `transparent=true`
//! - `layers=show:0,...,19`, `f=image`

use super::types::{CadastreLayer, ProviderSpec, TileProvider};
use crate::coord::{tile_bounds, TileCoord};

const SERVICE_ROOT: &str = "https://pkk.rosreestr.ru/arcgis/rest/services/PKK6";

/// ESRI well-known id for Web Mercator, used for both bbox and image.
const SPATIAL_REFERENCE: u32 = 102100;

const LAYER_COUNT: u32 = 20;

/// Cadastral map export provider.
pub struct CadastreExportProvider {
    layer: CadastreLayer,
    tile_size: u32,
}

impl CadastreExportProvider {
    pub fn new(layer: CadastreLayer) -> Self {
        Self {
            layer,
            tile_size: ProviderSpec::CadastreExport(layer).tile_size(),
        }
    }

    fn endpoint(&self) -> String {
        let service = match self.layer {
            CadastreLayer::Cadastre => "CadastreSelected",
            CadastreLayer::Thematic => "Thematic",
        };
        format!("{}/{}/MapServer/export", SERVICE_ROOT, service)
    }

    /// Tile bounds as `xmin,ymin,xmax,ymax` in Web Mercator meters.
    fn bbox(tile: &TileCoord) -> String {
        let (nw, se) = tile_bounds(tile);
        let (xmin, ymax) = nw.to_web_mercator();
        let (xmax, ymin) = se.to_web_mercator();
        format!("{},{},{},{}", xmin, ymin, xmax, ymax)
    }
}

impl TileProvider for CadastreExportProvider {
    fn spec(&self) -> ProviderSpec {
        ProviderSpec::CadastreExport(self.layer)
    }

    fn tile_url(&self, tile: &TileCoord, _shard: u8) -> String {
        let layers = (0..LAYER_COUNT)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{}?dpi=96&transparent=true&format=PNG32&layers=show:{}&bbox={}&bboxSR={sr}&imageSR={sr}&size={size},{size}&f=image",
            self.endpoint(),
            layers,
            Self::bbox(tile),
            sr = SPATIAL_REFERENCE,
            size = self.tile_size,
        )
    }
}
