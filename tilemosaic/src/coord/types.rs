//! Coordinate type definitions

use std::f64::consts::PI;
use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels accepted by the tile providers
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 23;

/// WGS84 semi-major axis used by spherical Web Mercator (EPSG:3857).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Half the circumference of the Web Mercator sphere, in meters.
pub const ORIGIN_SHIFT_M: f64 = PI * EARTH_RADIUS_M;

/// Returns the number of tiles along one axis at `zoom` (2^zoom).
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom
}

/// Tile index in the slippy-map scheme.
///
/// `x` grows eastward, `y` grows southward, both in `0..2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column, 0 at the antimeridian west edge
    pub x: u32,
    /// Row, 0 at the northern Mercator limit
    pub y: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    /// Creates a tile index, validating it against the zoom level.
    pub fn new(x: u32, y: u32, zoom: u8) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let n = tiles_per_axis(zoom);
        if x >= n || y >= n {
            return Err(CoordError::InvalidTile { x, y, zoom });
        }
        Ok(Self { x, y, zoom })
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A geographic position in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Projects the point to spherical Web Mercator meters (EPSG:3857).
    ///
    /// Returns `(x, y)`; latitude is clamped to the Mercator limit first so the
    /// result is always finite.
    pub fn to_web_mercator(&self) -> (f64, f64) {
        let lat = self.lat.clamp(MIN_LAT, MAX_LAT);
        let x = self.lon * ORIGIN_SHIFT_M / 180.0;
        let y = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
        (x, y * ORIGIN_SHIFT_M / 180.0)
    }
}

/// Geographic bounding box as entered by the user.
///
/// The start/stop pairs carry no ordering guarantee; callers may pass the
/// corners in any order and [`GeoBoundingBox::normalized`] sorts them out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBoundingBox {
    pub lat_start: f64,
    pub lat_stop: f64,
    pub lon_start: f64,
    pub lon_stop: f64,
}

impl GeoBoundingBox {
    pub fn new(lat_start: f64, lat_stop: f64, lon_start: f64, lon_stop: f64) -> Self {
        Self {
            lat_start,
            lat_stop,
            lon_start,
            lon_stop,
        }
    }

    /// Returns the north-west and south-east corners.
    pub fn normalized(&self) -> (GeoPoint, GeoPoint) {
        let north = self.lat_start.max(self.lat_stop);
        let south = self.lat_start.min(self.lat_stop);
        let west = self.lon_start.min(self.lon_stop);
        let east = self.lon_start.max(self.lon_stop);
        (GeoPoint::new(north, west), GeoPoint::new(south, east))
    }
}

/// Inclusive rectangle of tile indices at a single zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRect {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
    pub zoom: u8,
}

impl TileRect {
    /// Builds a rectangle from two opposite corners given in any order.
    pub fn from_corners(a: TileCoord, b: TileCoord) -> Self {
        debug_assert_eq!(a.zoom, b.zoom);
        Self {
            x_min: a.x.min(b.x),
            x_max: a.x.max(b.x),
            y_min: a.y.min(b.y),
            y_max: a.y.max(b.y),
            zoom: a.zoom,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    pub fn tile_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn contains(&self, tile: &TileCoord) -> bool {
        tile.zoom == self.zoom
            && (self.x_min..=self.x_max).contains(&tile.x)
            && (self.y_min..=self.y_max).contains(&tile.y)
    }

    /// Top-left tile of the rectangle.
    pub fn top_left(&self) -> TileCoord {
        TileCoord {
            x: self.x_min,
            y: self.y_min,
            zoom: self.zoom,
        }
    }

    /// Bottom-right tile of the rectangle.
    pub fn bottom_right(&self) -> TileCoord {
        TileCoord {
            x: self.x_max,
            y: self.y_max,
            zoom: self.zoom,
        }
    }

    /// Iterates every tile, column by column (x outer, y inner).
    pub fn tiles(&self) -> TileRectIter {
        TileRectIter {
            rect: *self,
            x: self.x_min,
            y: self.y_min,
            done: false,
        }
    }
}

/// Column-major iterator over a [`TileRect`].
#[derive(Debug, Clone)]
pub struct TileRectIter {
    rect: TileRect,
    x: u32,
    y: u32,
    done: bool,
}

impl Iterator for TileRectIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let tile = TileCoord {
            x: self.x,
            y: self.y,
            zoom: self.rect.zoom,
        };

        if self.y < self.rect.y_max {
            self.y += 1;
        } else if self.x < self.rect.x_max {
            self.x += 1;
            self.y = self.rect.y_min;
        } else {
            self.done = true;
        }

        Some(tile)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside -90..=90
    InvalidLatitude(f64),
    /// Longitude is outside -180..=180
    InvalidLongitude(f64),
    /// Zoom level is outside 0..=23
    InvalidZoom(u8),
    /// Tile index is outside the grid of its zoom level
    InvalidTile { x: u32, y: u32, zoom: u8 },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(f, "Invalid latitude: {} (must be between -90 and 90)", lat)
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::InvalidTile { x, y, zoom } => {
                write!(f, "Tile ({}, {}) is outside the grid at zoom {}", x, y, zoom)
            }
        }
    }
}

impl std::error::Error for CoordError {}
