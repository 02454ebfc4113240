//! Per-frame update parameters
//!
//! [`UpdateParameters`] is built fresh on the render thread for every frame and
//! handed to the style by the [`dispatcher::UpdateDispatcher`]. It owns its plain
//! values and only borrows everything else: the transform state and the shared
//! scheduler, file source, annotation manager and style all outlive it, which
//! the `'a` lifetime enforces. A snapshot is never stored past the dispatch
//! call that consumes it.

pub mod dispatcher;

use crate::core::constants::DEFAULT_PIXEL_RATIO;
use crate::core::mode::{DebugOptions, MapMode};
use crate::core::transform::TransformState;
use crate::tiles::prefetch::{PrefetchConfig, PrefetchPlan, PrefetchPlanner};
use crate::traits::{AnnotationManager, FileSource, Scheduler, Style};
use std::fmt;

/// Borrowed handles to the long-lived shared resources of the engine
#[derive(Clone, Copy)]
pub struct Resources<'a> {
    pub scheduler: &'a dyn Scheduler,
    pub file_source: &'a dyn FileSource,
    pub annotation_manager: &'a dyn AnnotationManager,
    pub style: &'a dyn Style,
}

impl<'a> Resources<'a> {
    pub fn new(
        scheduler: &'a dyn Scheduler,
        file_source: &'a dyn FileSource,
        annotation_manager: &'a dyn AnnotationManager,
        style: &'a dyn Style,
    ) -> Self {
        Self {
            scheduler,
            file_source,
            annotation_manager,
            style,
        }
    }
}

/// Immutable bundle describing one frame
///
/// Fields are private; there are no setters, so nothing observed through the
/// accessors can change between construction and the end of dispatch.
#[derive(Clone, Copy)]
pub struct UpdateParameters<'a> {
    pixel_ratio: f32,
    debug_options: DebugOptions,
    transform_state: &'a TransformState,
    mode: MapMode,
    prefetch: PrefetchConfig,
    resources: Resources<'a>,
}

impl<'a> UpdateParameters<'a> {
    pub fn builder(
        transform_state: &'a TransformState,
        resources: Resources<'a>,
    ) -> UpdateParametersBuilder<'a> {
        UpdateParametersBuilder::new(transform_state, resources)
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn debug_options(&self) -> DebugOptions {
        self.debug_options
    }

    pub fn transform_state(&self) -> &'a TransformState {
        self.transform_state
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    /// `None` or `Some(0)` both mean dynamic prefetching
    pub fn fixed_prefetch_zoom(&self) -> Option<u8> {
        self.prefetch.fixed_prefetch_zoom
    }

    pub fn dynamic_prefetch_zoom_delta(&self) -> i32 {
        self.prefetch.dynamic_prefetch_zoom_delta
    }

    pub fn prefetch_config(&self) -> PrefetchConfig {
        self.prefetch
    }

    /// Zoom levels to request this frame, within the transform's zoom limits
    pub fn prefetch_plan(&self) -> PrefetchPlan {
        PrefetchPlanner::plan_for(&self.prefetch, self.transform_state)
    }

    pub fn scheduler(&self) -> &'a dyn Scheduler {
        self.resources.scheduler
    }

    pub fn file_source(&self) -> &'a dyn FileSource {
        self.resources.file_source
    }

    pub fn annotation_manager(&self) -> &'a dyn AnnotationManager {
        self.resources.annotation_manager
    }

    pub fn style(&self) -> &'a dyn Style {
        self.resources.style
    }
}

impl fmt::Debug for UpdateParameters<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateParameters")
            .field("pixel_ratio", &self.pixel_ratio)
            .field("debug_options", &self.debug_options)
            .field("transform_state", self.transform_state)
            .field("mode", &self.mode)
            .field("prefetch", &self.prefetch)
            .field("scheduler", &self.resources.scheduler.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`UpdateParameters`]
///
/// Unset values default to a pixel ratio of 1, no debug flags, continuous
/// mode and no prefetching beyond the visible zoom.
pub struct UpdateParametersBuilder<'a> {
    pixel_ratio: f32,
    debug_options: DebugOptions,
    transform_state: &'a TransformState,
    mode: MapMode,
    prefetch: PrefetchConfig,
    resources: Resources<'a>,
}

impl<'a> UpdateParametersBuilder<'a> {
    pub fn new(transform_state: &'a TransformState, resources: Resources<'a>) -> Self {
        Self {
            pixel_ratio: DEFAULT_PIXEL_RATIO,
            debug_options: DebugOptions::NO_DEBUG,
            transform_state,
            mode: MapMode::default(),
            prefetch: PrefetchConfig::disabled(),
            resources,
        }
    }

    /// Non-positive or non-finite ratios are ignored
    pub fn pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            self.pixel_ratio = pixel_ratio;
        } else {
            log::warn!("ignoring invalid pixel ratio {}", pixel_ratio);
        }
        self
    }

    pub fn debug_options(mut self, debug_options: DebugOptions) -> Self {
        self.debug_options = debug_options;
        self
    }

    pub fn mode(mut self, mode: MapMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn prefetch(mut self, prefetch: PrefetchConfig) -> Self {
        self.prefetch = prefetch;
        self
    }

    pub fn fixed_prefetch_zoom(mut self, zoom: Option<u8>) -> Self {
        self.prefetch.fixed_prefetch_zoom = zoom;
        self
    }

    pub fn dynamic_prefetch_zoom_delta(mut self, delta: i32) -> Self {
        self.prefetch.dynamic_prefetch_zoom_delta = delta;
        self
    }

    pub fn build(self) -> UpdateParameters<'a> {
        UpdateParameters {
            pixel_ratio: self.pixel_ratio,
            debug_options: self.debug_options,
            transform_state: self.transform_state,
            mode: self.mode,
            prefetch: self.prefetch,
            resources: self.resources,
        }
    }
}

/// Build a frame snapshot in one call
pub fn build_snapshot<'a>(
    transform_state: &'a TransformState,
    debug_options: DebugOptions,
    mode: MapMode,
    prefetch: PrefetchConfig,
    pixel_ratio: f32,
    resources: Resources<'a>,
) -> UpdateParameters<'a> {
    UpdateParameters::builder(transform_state, resources)
        .pixel_ratio(pixel_ratio)
        .debug_options(debug_options)
        .mode(mode)
        .prefetch(prefetch)
        .build()
}


#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;
    use crate::core::geo::{LatLng, Point};

    #[test]
    fn test_builder_defaults() {
        let fixture = Fixture::default();
        let transform = TransformState::default();
        let params = UpdateParameters::builder(&transform, fixture.resources()).build();

        assert_eq!(params.pixel_ratio(), 1.0);
        assert!(params.debug_options().is_empty());
        assert_eq!(params.mode(), MapMode::Continuous);
        assert_eq!(params.fixed_prefetch_zoom(), None);
        assert_eq!(params.dynamic_prefetch_zoom_delta(), 0);
        assert!(!params.prefetch_plan().has_extra_zoom());
    }

    #[test]
    fn test_invalid_pixel_ratio_is_ignored() {
        let fixture = Fixture::default();
        let transform = TransformState::default();
        let params = UpdateParameters::builder(&transform, fixture.resources())
            .pixel_ratio(2.0)
            .pixel_ratio(0.0)
            .pixel_ratio(f32::NAN)
            .build();
        assert_eq!(params.pixel_ratio(), 2.0);
    }

    #[test]
    fn test_snapshot_borrows_transform_and_handles() {
        let fixture = Fixture::default();
        let transform = TransformState::new(LatLng::new(10.0, 20.0), 7.5, Point::new(800.0, 600.0));
        let params = build_snapshot(
            &transform,
            DebugOptions::TILE_BORDERS,
            MapMode::Static,
            PrefetchConfig::dynamic(2),
            1.5,
            fixture.resources(),
        );

        assert!(std::ptr::eq(params.transform_state(), &transform));
        assert_eq!(params.transform_state().integer_zoom(), 7);
        assert_eq!(params.prefetch_plan().prefetch_zoom, 9);
        assert_eq!(params.annotation_manager().revision(), 0);
        assert_eq!(params.scheduler().name(), "immediate");
        assert!(format!("{:?}", params).contains("pixel_ratio: 1.5"));
    }

    #[test]
    fn test_fixed_prefetch_overrides_delta() {
        let fixture = Fixture::default();
        let transform = TransformState::new(LatLng::default(), 12.3, Point::new(256.0, 256.0));
        let params = UpdateParameters::builder(&transform, fixture.resources())
            .dynamic_prefetch_zoom_delta(4)
            .fixed_prefetch_zoom(Some(8))
            .build();
        assert_eq!(params.prefetch_plan().prefetch_zoom, 8);
        assert!(params.prefetch_plan().is_ancestor_prefetch());
    }
}
