//! Coordinate conversion module
//!
//! Converts between geographic coordinates (latitude/longitude) and the
//! Web Mercator slippy-tile grid shared by all imagery providers, and
//! derives Bing quadkeys from tile indices.

mod types;

pub use types::{
    tiles_per_axis, CoordError, GeoBoundingBox, GeoPoint, TileCoord, TileRect, TileRectIter,
    EARTH_RADIUS_M, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM, ORIGIN_SHIFT_M,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to the tile containing them.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-90.0 to 90.0, clamped to the Mercator limit)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 23)
///
/// # Returns
///
/// The tile coordinates, or an error if inputs are out of range. Points on
/// the east or south edge of the world map land in the last tile rather
/// than one past it.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let lat = lat.clamp(MIN_LAT, MAX_LAT);
    let n = tiles_per_axis(zoom) as f64;
    let last = tiles_per_axis(zoom) - 1;

    let x = ((lon + 180.0) / 360.0 * n) as u32;

    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).max(0.0) as u32;

    Ok(TileCoord {
        x: x.min(last),
        y: y.min(last),
        zoom,
    })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the position of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> GeoPoint {
    pixel_corner(tile.x, tile.y, tile.zoom)
}

/// Returns the geographic bounds of a tile as `(northwest, southeast)`.
pub fn tile_bounds(tile: &TileCoord) -> (GeoPoint, GeoPoint) {
    let nw = pixel_corner(tile.x, tile.y, tile.zoom);
    let se = pixel_corner(tile.x + 1, tile.y + 1, tile.zoom);
    (nw, se)
}

fn pixel_corner(x: u32, y: u32, zoom: u8) -> GeoPoint {
    let n = tiles_per_axis(zoom) as f64;
    let lon = x as f64 / n * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan();
    GeoPoint::new(lat_rad.to_degrees(), lon)
}

/// Converts a geographic bounding box to the inclusive tile rectangle that
/// covers it.
///
/// The box corners may be given in any order. A box whose start and stop
/// coincide collapses to a single tile.
pub fn bbox_to_tile_rect(bbox: &GeoBoundingBox, zoom: u8) -> Result<TileRect, CoordError> {
    let (nw, se) = bbox.normalized();
    let top_left = to_tile_coords(nw.lat, nw.lon, zoom)?;
    let bottom_right = to_tile_coords(se.lat, se.lon, zoom)?;
    Ok(TileRect::from_corners(top_left, bottom_right))
}

/// Converts a tile index to a Bing Maps quadkey.
///
/// Each character encodes one zoom level, most significant first: the x bit
/// contributes 1 and the y bit contributes 2. Zoom 0 yields an empty key.
pub fn tile_to_quadkey(tile: &TileCoord) -> String {
    let mut quadkey = String::with_capacity(tile.zoom as usize);
    for level in (1..=tile.zoom).rev() {
        let mask = 1u32 << (level - 1);
        let mut digit = b'0';
        if tile.x & mask != 0 {
            digit += 1;
        }
        if tile.y & mask != 0 {
            digit += 2;
        }
        quadkey.push(digit as char);
    }
    quadkey
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        let tile = to_tile_coords(40.7128, -74.0060, 16).unwrap();
        assert_eq!(tile.y, 24640);
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = to_tile_coords(91.0, 0.0, 10);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = to_tile_coords(0.0, 180.5, 10);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = to_tile_coords(0.0, 0.0, MAX_ZOOM + 1);
        assert!(matches!(result, Err(CoordError::InvalidZoom(_))));
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(to_tile_coords(f64::NAN, 0.0, 4).is_err());
        assert!(to_tile_coords(0.0, f64::NAN, 4).is_err());
    }

    #[test]
    fn test_world_edges_stay_in_grid() {
        let se = to_tile_coords(-90.0, 180.0, 3).unwrap();
        assert_eq!((se.x, se.y), (7, 7));

        let nw = to_tile_coords(90.0, -180.0, 3).unwrap();
        assert_eq!((nw.x, nw.y), (0, 0));
    }

    #[test]
    fn test_zoom_zero_is_single_tile() {
        let tile = to_tile_coords(44.6, 33.5, 0).unwrap();
        assert_eq!((tile.x, tile.y, tile.zoom), (0, 0, 0));
    }

    #[test]
    fn test_tile_to_lat_lon_northwest_corner() {
        let tile = TileCoord {
            x: 19295,
            y: 24640,
            zoom: 16,
        };

        let corner = tile_to_lat_lon(&tile);

        assert!((corner.lat - 40.713).abs() < 0.01);
        assert!((corner.lon - (-74.007)).abs() < 0.01);
    }

    #[test]
    fn test_tile_bounds_orientation() {
        let tile = TileCoord {
            x: 2,
            y: 1,
            zoom: 2,
        };

        let (nw, se) = tile_bounds(&tile);

        assert!(nw.lat > se.lat, "north edge must be above south edge");
        assert!(nw.lon < se.lon, "west edge must be left of east edge");
        assert_eq!(nw.lon, 0.0);
        assert_eq!(se.lon, 90.0);
        assert!(se.lat.abs() < 1e-9, "tile row 1 of 4 ends at the equator");
    }

    #[test]
    fn test_quadkey_reference_vector() {
        let tile = TileCoord {
            x: 3,
            y: 5,
            zoom: 3,
        };
        assert_eq!(tile_to_quadkey(&tile), "213");
    }

    #[test]
    fn test_quadkey_length_matches_zoom() {
        let tile = TileCoord {
            x: 0,
            y: 0,
            zoom: 0,
        };
        assert_eq!(tile_to_quadkey(&tile), "");

        let tile = TileCoord {
            x: 1,
            y: 1,
            zoom: 1,
        };
        assert_eq!(tile_to_quadkey(&tile), "3");

        let tile = to_tile_coords(44.6, 33.5, 17).unwrap();
        assert_eq!(tile_to_quadkey(&tile).len(), 17);
    }

    #[test]
    fn test_bbox_swapped_corners_same_rect() {
        let forward = GeoBoundingBox::new(44.65, 44.487, 33.377, 33.63);
        let backward = GeoBoundingBox::new(44.487, 44.65, 33.63, 33.377);

        for zoom in [2, 10, 15] {
            assert_eq!(
                bbox_to_tile_rect(&forward, zoom).unwrap(),
                bbox_to_tile_rect(&backward, zoom).unwrap()
            );
        }
    }

    #[test]
    fn test_bbox_degenerate_is_single_tile() {
        let bbox = GeoBoundingBox::new(44.6, 44.6, 33.5, 33.5);
        let rect = bbox_to_tile_rect(&bbox, 14).unwrap();

        assert_eq!(rect.tile_count(), 1);
        assert_eq!(rect.top_left(), rect.bottom_right());
    }

    #[test]
    fn test_bbox_sevastopol_zoom_two() {
        let bbox = GeoBoundingBox::new(44.65, 44.487, 33.377, 33.63);
        let rect = bbox_to_tile_rect(&bbox, 2).unwrap();

        assert_eq!(rect.tile_count(), 1);
        assert_eq!((rect.x_min, rect.y_min), (2, 1));
    }

    #[test]
    fn test_rect_iterates_column_major() {
        let rect = TileRect {
            x_min: 4,
            x_max: 5,
            y_min: 7,
            y_max: 9,
            zoom: 5,
        };

        let order: Vec<(u32, u32)> = rect.tiles().map(|t| (t.x, t.y)).collect();

        assert_eq!(
            order,
            vec![(4, 7), (4, 8), (4, 9), (5, 7), (5, 8), (5, 9)]
        );
        assert_eq!(rect.tile_count(), 6);
    }

    #[test]
    fn test_tile_coord_new_validates_range() {
        assert!(TileCoord::new(3, 3, 2).is_ok());
        assert_eq!(
            TileCoord::new(4, 0, 2),
            Err(CoordError::InvalidTile {
                x: 4,
                y: 0,
                zoom: 2
            })
        );
    }

    #[test]
    fn test_web_mercator_known_points() {
        let (x, y) = GeoPoint::new(0.0, 0.0).to_web_mercator();
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        let (x, _) = GeoPoint::new(0.0, 180.0).to_web_mercator();
        assert!((x - ORIGIN_SHIFT_M).abs() < 1e-6);

        let (_, y) = GeoPoint::new(MAX_LAT, 0.0).to_web_mercator();
        assert!((y - ORIGIN_SHIFT_M).abs() < 1.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_point_lies_inside_its_tile(
                lat in -85.0..85.0_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=20
            ) {
                let tile = to_tile_coords(lat, lon, zoom)?;
                let (nw, se) = tile_bounds(&tile);
                let eps = 1e-9;

                prop_assert!(lat <= nw.lat + eps && lat >= se.lat - eps,
                    "lat {} not within [{}, {}] at zoom {}", lat, se.lat, nw.lat, zoom);
                prop_assert!(lon >= nw.lon - eps && lon <= se.lon + eps,
                    "lon {} not within [{}, {}] at zoom {}", lon, nw.lon, se.lon, zoom);
            }

            #[test]
            fn test_tile_coords_in_bounds(
                lat in -90.0..=90.0_f64,
                lon in -180.0..=180.0_f64,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let tile = to_tile_coords(lat, lon, zoom)?;
                let n = tiles_per_axis(zoom);
                prop_assert!(tile.x < n);
                prop_assert!(tile.y < n);
                prop_assert_eq!(tile.zoom, zoom);
            }

            #[test]
            fn test_rect_is_order_independent(
                lat_a in -80.0..80.0_f64,
                lat_b in -80.0..80.0_f64,
                lon_a in -179.0..179.0_f64,
                lon_b in -179.0..179.0_f64,
                zoom in 0u8..=16
            ) {
                let one = bbox_to_tile_rect(&GeoBoundingBox::new(lat_a, lat_b, lon_a, lon_b), zoom)?;
                let two = bbox_to_tile_rect(&GeoBoundingBox::new(lat_b, lat_a, lon_b, lon_a), zoom)?;
                let three = bbox_to_tile_rect(&GeoBoundingBox::new(lat_a, lat_b, lon_b, lon_a), zoom)?;

                prop_assert_eq!(one, two);
                prop_assert_eq!(one, three);
                prop_assert!(one.x_min <= one.x_max);
                prop_assert!(one.y_min <= one.y_max);
            }

            #[test]
            fn test_tile_bounds_round_trip_within_one_tile(
                fx in 0.0..1.0_f64,
                fy in 0.0..1.0_f64,
                zoom in 0u8..=18
            ) {
                let n = tiles_per_axis(zoom);
                let x = ((fx * n as f64) as u32).min(n - 1);
                let y = ((fy * n as f64) as u32).min(n - 1);
                let tile = TileCoord::new(x, y, zoom)?;
                let (nw, se) = tile_bounds(&tile);

                // Exact bounds sit on the neighbours' edges, so each side may
                // land one tile off.
                let rect = bbox_to_tile_rect(&GeoBoundingBox::new(nw.lat, se.lat, nw.lon, se.lon), zoom)?;
                prop_assert!(rect.contains(&tile), "{:?} misses {:?}", rect, tile);
                prop_assert!(rect.x_min + 1 >= x && rect.x_max <= x + 1, "{:?} from {:?}", rect, tile);
                prop_assert!(rect.y_min + 1 >= y && rect.y_max <= y + 1, "{:?} from {:?}", rect, tile);

                // Pulled slightly inside, the bounds select the tile alone.
                let dlat = (nw.lat - se.lat) * 0.01;
                let dlon = (se.lon - nw.lon) * 0.01;
                let inset = GeoBoundingBox::new(nw.lat - dlat, se.lat + dlat, nw.lon + dlon, se.lon - dlon);
                let rect = bbox_to_tile_rect(&inset, zoom)?;
                prop_assert_eq!(rect.tile_count(), 1);
                prop_assert!(rect.contains(&tile));
            }

            #[test]
            fn test_quadkey_is_unique_per_tile(
                x1 in 0u32..256, y1 in 0u32..256,
                x2 in 0u32..256, y2 in 0u32..256,
            ) {
                let a = TileCoord { x: x1, y: y1, zoom: 8 };
                let b = TileCoord { x: x2, y: y2, zoom: 8 };
                prop_assert_eq!(a == b, tile_to_quadkey(&a) == tile_to_quadkey(&b));
            }
        }
    }
}
