//! # tileframe
//!
//! The per-frame update pipeline of a tiled map engine.
//!
//! Once per rendered frame the render thread packages the camera state, debug
//! flags, prefetch strategy and handles to the shared scheduler, file source,
//! annotation manager and style into an immutable [`UpdateParameters`] value and
//! hands it to the style through the [`UpdateDispatcher`]. The style decides
//! which tiles to request; the requests flow through the shared [`FileSource`],
//! gated by the process-wide [`NetworkStatus`], and run on the shared
//! [`Scheduler`].

pub mod core;
pub mod gl;
pub mod network;
pub mod prelude;
pub mod style;
pub mod tiles;
pub mod traits;
pub mod update;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{PipelineConfig, PipelineProfile},
    geo::{LatLng, Point, TileCoord},
    map::Map,
    mode::{DebugOptions, MapMode},
    transform::TransformState,
};

pub use network::{connectivity::Connectivity, NetworkMode, NetworkStatus};

pub use style::catalog::{default_styles, StyleCatalog, StyleCatalogEntry};

pub use gl::extensions::{initialize_extensions, ExtensionSet, GlExtensions, ProcAddress};

pub use tiles::{
    file_source::{DefaultFileSource, Resource, Response},
    prefetch::{PrefetchConfig, PrefetchPlan, PrefetchPlanner, ZoomRange},
    scheduler::{ImmediateScheduler, ThreadPool},
};

pub use traits::{AnnotationManager, FileSource, Scheduler, Style};

pub use update::{dispatcher::UpdateDispatcher, Resources, UpdateParameters};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Graphics error: {0}")]
    Graphics(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Resource unavailable offline: {0}")]
    Offline(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(cfg!(test))
        .try_init();
}
