pub mod cache;
pub mod fetcher;
pub mod file_source;
pub mod prefetch;
pub mod scheduler;
pub mod source;

// Re-exports for convenience
pub use cache::TileCache;
pub use file_source::{DefaultFileSource, FileSourceStats, Resource, Response};
pub use prefetch::{PrefetchConfig, PrefetchPlan, PrefetchPlanner, ZoomRange};
pub use source::{TileSource, UrlTemplate};

/// Priority attached to a tile request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TilePriority {
    /// Background/low priority
    #[default]
    Background = 1,
    /// Tiles at the prefetch zoom, loaded ahead of need
    Prefetch = 10,
    /// One ring around visible area
    Adjacent = 50,
    /// Currently visible tiles (highest priority)
    Visible = 100,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(TilePriority::Visible > TilePriority::Adjacent);
        assert!(TilePriority::Adjacent > TilePriority::Prefetch);
        assert!(TilePriority::Prefetch > TilePriority::Background);
    }
}
