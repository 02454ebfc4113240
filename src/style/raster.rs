use crate::core::constants::MAX_DESCENDANT_PREFETCH_LEVELS;
use crate::core::geo::TileCoord;
use crate::prelude::HashSet;
use crate::tiles::file_source::{Resource, Response};
use crate::tiles::source::{TileSource, UrlTemplate};
use crate::tiles::TilePriority;
use crate::traits::Style;
use crate::update::UpdateParameters;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Tiles this style has asked for and what came back
#[derive(Debug, Default)]
struct TileState {
    requested: HashSet<String>,
    loaded: HashSet<TileCoord>,
    failed: HashSet<TileCoord>,
}

/// Reference style with a single raster tile source
///
/// Each update requests the tiles covering the viewport at the ideal zoom, then
/// at the prefetch zoom, through the frame's file source. A prefetch zoom above
/// the ideal one is limited to the next level down the pyramid. A URL is
/// requested once for the lifetime of the style; a failed tile is requested
/// again on a later frame.
pub struct RasterTileStyle {
    source: UrlTemplate,
    tiles: Arc<Mutex<TileState>>,
    updates: AtomicU64,
    last_annotation_revision: AtomicU64,
    issued: AtomicUsize,
}

impl RasterTileStyle {
    pub fn new(source: UrlTemplate) -> Self {
        Self {
            source,
            tiles: Arc::new(Mutex::new(TileState::default())),
            updates: AtomicU64::new(0),
            last_annotation_revision: AtomicU64::new(0),
            issued: AtomicUsize::new(0),
        }
    }

    pub fn source(&self) -> &UrlTemplate {
        &self.source
    }

    pub fn update_count(&self) -> u64 {
        self.updates.load(Ordering::Acquire)
    }

    /// Requests handed to the file source so far
    pub fn issued_requests(&self) -> usize {
        self.issued.load(Ordering::Acquire)
    }

    pub fn annotation_revision(&self) -> u64 {
        self.last_annotation_revision.load(Ordering::Acquire)
    }

    pub fn is_loaded(&self, coord: &TileCoord) -> bool {
        self.tiles
            .lock()
            .map(|tiles| tiles.loaded.contains(coord))
            .unwrap_or(false)
    }

    pub fn loaded_tiles(&self) -> Vec<TileCoord> {
        let mut loaded: Vec<TileCoord> = self
            .tiles
            .lock()
            .map(|tiles| tiles.loaded.iter().copied().collect())
            .unwrap_or_default();
        loaded.sort();
        loaded
    }

    pub fn failed_tiles(&self) -> Vec<TileCoord> {
        let mut failed: Vec<TileCoord> = self
            .tiles
            .lock()
            .map(|tiles| tiles.failed.iter().copied().collect())
            .unwrap_or_default();
        failed.sort();
        failed
    }

    fn request_tiles(
        &self,
        parameters: &UpdateParameters<'_>,
        coords: Vec<TileCoord>,
        priority: TilePriority,
    ) {
        for coord in coords {
            let url = self.source.url_for_ratio(coord, parameters.pixel_ratio());
            let fresh = match self.tiles.lock() {
                Ok(mut tiles) => tiles.requested.insert(url.clone()),
                Err(_) => false,
            };
            if !fresh {
                continue;
            }

            let tiles = Arc::clone(&self.tiles);
            let resource = Resource::tile(url, coord, priority);
            self.issued.fetch_add(1, Ordering::AcqRel);
            parameters.file_source().request(
                resource,
                Box::new(move |response: Response| {
                    let Ok(mut tiles) = tiles.lock() else {
                        return;
                    };
                    match response.data {
                        Ok(_) => {
                            tiles.failed.remove(&coord);
                            tiles.loaded.insert(coord);
                        }
                        Err(err) => {
                            log::debug!("tile {} failed: {}", coord, err);
                            tiles.requested.remove(&response.resource.url);
                            tiles.failed.insert(coord);
                        }
                    }
                }),
            );
        }
    }
}

impl Style for RasterTileStyle {
    fn update(&self, parameters: &UpdateParameters<'_>) {
        self.updates.fetch_add(1, Ordering::AcqRel);
        self.last_annotation_revision
            .store(parameters.annotation_manager().revision(), Ordering::Release);

        let transform = parameters.transform_state();
        let range = self.source.zoom_range();
        let plan = parameters.prefetch_plan();
        let ideal = range.clamp(plan.ideal_zoom as i64);

        self.request_tiles(parameters, transform.covering_tiles(ideal), TilePriority::Visible);

        // descendants multiply by four per level, so only the next one is fetched
        let prefetch = range
            .clamp(plan.prefetch_zoom as i64)
            .min(ideal.saturating_add(MAX_DESCENDANT_PREFETCH_LEVELS));
        if prefetch != ideal {
            self.request_tiles(
                parameters,
                transform.covering_tiles(prefetch),
                TilePriority::Prefetch,
            );
        }
    }
}
