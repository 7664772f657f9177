//! Bounding box to request list.

use rand::seq::SliceRandom;
use tracing::debug;

use crate::coord::{bbox_to_tile_rect, CoordError, GeoBoundingBox, TileRect};
use crate::fetch::FetchRequest;
use crate::provider::ProviderResolver;

/// The tiles covering one bounding box at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlan {
    rect: TileRect,
}

impl TilePlan {
    pub fn new(bbox: &GeoBoundingBox, zoom: u8) -> Result<Self, CoordError> {
        let rect = bbox_to_tile_rect(bbox, zoom)?;
        debug!(
            zoom,
            x_min = rect.x_min,
            x_max = rect.x_max,
            y_min = rect.y_min,
            y_max = rect.y_max,
            tiles = rect.tile_count(),
            "Planned tile rectangle"
        );
        Ok(Self { rect })
    }

    pub fn rect(&self) -> &TileRect {
        &self.rect
    }

    pub fn tile_count(&self) -> u64 {
        self.rect.tile_count()
    }

    /// One request per tile, column by column.
    pub fn requests(&self, resolver: &mut ProviderResolver) -> Vec<FetchRequest> {
        self.rect.tiles().map(|tile| resolver.resolve(&tile)).collect()
    }

    /// Same requests in random order, spreading load across the area.
    pub fn shuffled_requests(&self, resolver: &mut ProviderResolver) -> Vec<FetchRequest> {
        let mut requests = self.requests(resolver);
        requests.shuffle(resolver.rng_mut());
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use crate::provider::ProviderSpec;

    fn sevastopol() -> GeoBoundingBox {
        GeoBoundingBox::new(44.65, 44.487, 33.377, 33.63)
    }

    #[test]
    fn test_plan_counts_tiles() {
        let plan = TilePlan::new(&sevastopol(), 13).unwrap();
        let rect = plan.rect();
        assert_eq!(
            plan.tile_count(),
            u64::from(rect.width()) * u64::from(rect.height())
        );
        assert!(plan.tile_count() > 1);
    }

    #[test]
    fn test_requests_are_column_major() {
        let plan = TilePlan::new(&sevastopol(), 13).unwrap();
        let mut resolver = ProviderResolver::with_seed(ProviderSpec::BingSatellite, "/t", 1);
        let tiles: Vec<TileCoord> = plan
            .requests(&mut resolver)
            .into_iter()
            .map(|r| r.tile)
            .collect();

        let mut expected = tiles.clone();
        expected.sort_by_key(|t| (t.x, t.y));
        assert_eq!(tiles, expected);
        assert_eq!(tiles.len() as u64, plan.tile_count());
    }

    #[test]
    fn test_shuffled_requests_cover_same_tiles() {
        let plan = TilePlan::new(&sevastopol(), 14).unwrap();
        let mut resolver = ProviderResolver::with_seed(ProviderSpec::YandexRoad, "/t", 3);
        let mut shuffled: Vec<_> = plan
            .shuffled_requests(&mut resolver)
            .into_iter()
            .map(|r| (r.tile.x, r.tile.y))
            .collect();
        shuffled.sort();

        let mut ordered: Vec<_> = plan.rect().tiles().map(|t| (t.x, t.y)).collect();
        ordered.sort();
        assert_eq!(shuffled, ordered);
    }

    #[test]
    fn test_shuffle_is_reproducible_with_seed() {
        let plan = TilePlan::new(&sevastopol(), 14).unwrap();
        let mut a = ProviderResolver::with_seed(ProviderSpec::BingRoad, "/t", 11);
        let mut b = ProviderResolver::with_seed(ProviderSpec::BingRoad, "/t", 11);
        assert_eq!(plan.shuffled_requests(&mut a), plan.shuffled_requests(&mut b));
    }

    #[test]
    fn test_invalid_bbox_rejected() {
        let bbox = GeoBoundingBox::new(95.0, 10.0, 0.0, 1.0);
        assert!(TilePlan::new(&bbox, 5).is_err());
    }
}
