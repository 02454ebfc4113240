use crate::core::constants::MAX_LATITUDE;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the Web Mercator range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Position in world pixels for a world of `world_size` pixels per side
    pub fn project(&self, world_size: f64) -> Point {
        let lat_rad = Self::clamp_lat(self.lat).to_radians();
        let x = (Self::wrap_lng(self.lng) + 180.0) / 360.0 * world_size;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world_size;
        Point::new(x, y)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a tile coordinate in the slippy map tile system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Creates a tile coordinate from a LatLng and zoom level
    pub fn from_lat_lng(lat_lng: &LatLng, zoom: u8) -> Self {
        let n = Self::tiles_per_side(zoom) as f64;
        let world = lat_lng.project(n);
        let max = Self::tiles_per_side(zoom).saturating_sub(1) as f64;

        Self::new(
            world.x.floor().clamp(0.0, max) as u32,
            world.y.floor().clamp(0.0, max) as u32,
            zoom,
        )
    }

    /// Number of tiles along one axis at `zoom`
    pub fn tiles_per_side(zoom: u8) -> u32 {
        1_u32 << zoom.min(31)
    }

    /// Checks if the tile is valid for its zoom level
    pub fn is_valid(&self) -> bool {
        let max_coord = Self::tiles_per_side(self.z);
        self.x < max_coord && self.y < max_coord
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Geometry type of a tile feature. The raw values are shared with the tile
/// geometry encoding and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FeatureType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
}

impl TryFrom<u8> for FeatureType {
    type Error = crate::Error;

    fn try_from(raw: u8) -> crate::Result<Self> {
        match raw {
            1 => Ok(Self::Point),
            2 => Ok(Self::LineString),
            3 => Ok(Self::Polygon),
            other => Err(crate::Error::InvalidValue(format!(
                "unknown feature type {other}"
            ))),
        }
    }
}
