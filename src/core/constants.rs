//! Engine-wide constants for the tile grid and frame pipeline.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 512;

/// Lowest zoom level of the tile pyramid.
pub const MIN_ZOOM: u8 = 0;

/// Highest zoom level any tile source is expected to serve.
pub const MAX_ZOOM: u8 = 22;

/// Zoom offset used for dynamic prefetching when nothing else is configured.
/// Zero prefetches nothing beyond the visible tiles; negative values prefetch
/// lower-detail ancestors.
pub const DEFAULT_DYNAMIC_PREFETCH_ZOOM_DELTA: i32 = 0;

/// Levels above the visible zoom a style will prefetch at most.
pub const MAX_DESCENDANT_PREFETCH_LEVELS: u8 = 1;

/// Device pixel density assumed when the host does not report one.
pub const DEFAULT_PIXEL_RATIO: f32 = 1.0;

/// Number of tiles the in-memory cache keeps by default.
pub const DEFAULT_TILE_CACHE_SIZE: usize = 1024;

/// Web Mercator latitude limit.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;
