//! Prelude module for common tileframe types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use tileframe::prelude::*;`

pub use crate::core::{
    config::{FileSourceConfig, PipelineConfig, PipelineProfile, SchedulerConfig},
    geo::{FeatureType, LatLng, Point, TileCoord},
    map::Map,
    mode::{DebugOptions, MapMode},
    transform::TransformState,
};

pub use crate::network::{connectivity::Connectivity, NetworkMode, NetworkStatus};

pub use crate::style::{
    catalog::{default_styles, StyleCatalog, StyleCatalogEntry},
    raster::RasterTileStyle,
    AnnotationRevision,
};

pub use crate::tiles::{
    cache::TileCache,
    fetcher::{HttpFetcher, StaticFetcher},
    file_source::{DefaultFileSource, Resource, Response},
    prefetch::{PrefetchConfig, PrefetchPlan, PrefetchPlanner, ZoomRange},
    scheduler::{ImmediateScheduler, ThreadPool},
    source::{TileSource, UrlTemplate},
    TilePriority,
};

#[cfg(feature = "tokio-runtime")]
pub use crate::tiles::scheduler::TokioScheduler;

pub use crate::traits::{AnnotationManager, Fetcher, FileSource, Scheduler, Style, Task};

pub use crate::update::{dispatcher::UpdateDispatcher, Resources, UpdateParameters};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
