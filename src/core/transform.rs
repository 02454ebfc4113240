//! Viewport camera state and the tile ranges it covers

use crate::core::constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, Point, TileCoord};
use crate::tiles::prefetch::ZoomRange;
use serde::{Deserialize, Serialize};

/// Camera state the render thread owns and every frame borrows read-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current, possibly fractional, zoom level
    zoom: f64,
    /// The size of the viewport in logical pixels
    pub size: Point,
    /// The minimum allowed zoom level
    min_zoom: u8,
    /// The maximum allowed zoom level
    max_zoom: u8,
}

impl TransformState {
    /// Creates a new transform state, clamping `zoom` to the default range
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM as f64, MAX_ZOOM as f64),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom floored to the tile grid
    pub fn integer_zoom(&self) -> u8 {
        self.zoom.floor() as u8
    }

    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    pub fn zoom_range(&self) -> ZoomRange {
        ZoomRange::new(self.min_zoom, self.max_zoom)
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom as f64, self.max_zoom as f64);
    }

    /// Sets the center, clamping latitude to the projectable range
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), LatLng::wrap_lng(center.lng));
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits; both are capped at [`MAX_ZOOM`] and swapped limits
    /// are reordered
    pub fn set_zoom_limits(&mut self, min_zoom: u8, max_zoom: u8) {
        let range = ZoomRange::new(min_zoom.min(MAX_ZOOM), max_zoom.min(MAX_ZOOM));
        self.min_zoom = range.min;
        self.max_zoom = range.max;
        self.zoom = self.zoom.clamp(self.min_zoom as f64, self.max_zoom as f64);
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    /// Tiles covering the viewport at integer `zoom`, nearest to the center first
    pub fn covering_tiles(&self, zoom: u8) -> Vec<TileCoord> {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return Vec::new();
        }

        let tile_size = TILE_SIZE as f64;
        let center = self.center.project(tile_size * self.scale());
        let half = self.size.multiply(0.5);
        // world pixels at the current zoom -> tile units at the target zoom
        let factor = 2_f64.powi(zoom as i32) / self.scale() / tile_size;
        let last = TileCoord::tiles_per_side(zoom).saturating_sub(1) as f64;

        let to_range = |lo: f64, hi: f64| {
            let start = (lo * factor).floor().clamp(0.0, last) as u32;
            let end = ((hi * factor).ceil() - 1.0).clamp(0.0, last) as u32;
            (start, end.max(start))
        };
        let (x0, x1) = to_range(center.x - half.x, center.x + half.x);
        let (y0, y1) = to_range(center.y - half.y, center.y + half.y);

        let mut tiles: Vec<TileCoord> = (y0..=y1)
            .flat_map(|y| (x0..=x1).map(move |x| TileCoord::new(x, y, zoom)))
            .collect();

        let focus = center.multiply(factor);
        tiles.sort_by(|a, b| {
            let da = distance_sq(a, &focus);
            let db = distance_sq(b, &focus);
            da.total_cmp(&db).then_with(|| a.cmp(b))
        });
        tiles
    }
}

fn distance_sq(tile: &TileCoord, focus: &Point) -> f64 {
    let dx = tile.x as f64 + 0.5 - focus.x;
    let dy = tile.y as f64 + 0.5 - focus.y;
    dx * dx + dy * dy
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new(LatLng::default(), 0.0, Point::new(512.0, 512.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_clamped() {
        let mut state = TransformState::new(LatLng::default(), 40.0, Point::new(800.0, 600.0));
        assert_eq!(state.zoom(), MAX_ZOOM as f64);

        state.set_zoom_limits(2, 14);
        assert_eq!(state.zoom(), 14.0);

        state.set_zoom(0.5);
        assert_eq!(state.zoom(), 2.0);
    }

    #[test]
    fn test_zoom_limits_above_max_are_capped() {
        let mut state = TransformState::new(LatLng::default(), 5.0, Point::new(800.0, 600.0));
        state.set_zoom_limits(30, 40);
        assert_eq!(state.min_zoom(), MAX_ZOOM);
        assert_eq!(state.max_zoom(), MAX_ZOOM);
        assert_eq!(state.zoom(), MAX_ZOOM as f64);

        state.set_zoom_limits(25, 3);
        assert_eq!((state.min_zoom(), state.max_zoom()), (3, MAX_ZOOM));
    }

    #[test]
    fn test_integer_zoom_floors() {
        let state = TransformState::new(LatLng::default(), 10.7, Point::new(800.0, 600.0));
        assert_eq!(state.integer_zoom(), 10);
    }

    #[test]
    fn test_covering_tiles_world_view() {
        let state = TransformState::default();
        assert_eq!(state.covering_tiles(0), vec![TileCoord::new(0, 0, 0)]);
        assert_eq!(state.covering_tiles(1).len(), 4);
    }

    #[test]
    fn test_covering_tiles_start_at_center() {
        let state = TransformState::new(LatLng::new(40.7128, -74.0060), 10.0, Point::new(1024.0, 768.0));
        let tiles = state.covering_tiles(10);
        assert!(!tiles.is_empty());
        assert_eq!(tiles[0], TileCoord::from_lat_lng(&state.center, 10));
        assert!(tiles.iter().all(|tile| tile.z == 10 && tile.is_valid()));
    }

    #[test]
    fn test_empty_viewport_covers_nothing() {
        let state = TransformState::new(LatLng::default(), 3.0, Point::new(0.0, 0.0));
        assert!(state.covering_tiles(3).is_empty());
    }
}
