use crate::{
    core::{
        config::PipelineConfig,
        constants::DEFAULT_PIXEL_RATIO,
        geo::{LatLng, Point},
        mode::{DebugOptions, MapMode},
        transform::TransformState,
    },
    network::NetworkStatus,
    style::AnnotationRevision,
    tiles::{file_source::DefaultFileSource, prefetch::PrefetchConfig, scheduler::ThreadPool},
    traits::{AnnotationManager, FileSource, Scheduler, Style},
    update::{build_snapshot, dispatcher::UpdateDispatcher, Resources},
    Error, Result,
};
use std::sync::Arc;

/// Render-thread owner of the frame state
///
/// The map owns the camera, the per-frame settings and shared handles to the
/// long-lived resources. Each call to [`Map::render_frame`] builds a fresh
/// snapshot borrowing from it and dispatches it to the style.
pub struct Map {
    transform: TransformState,
    debug_options: DebugOptions,
    prefetch: PrefetchConfig,
    pixel_ratio: f32,
    mode: MapMode,
    scheduler: Arc<dyn Scheduler>,
    file_source: Arc<dyn FileSource>,
    annotations: Arc<dyn AnnotationManager>,
    style: Arc<dyn Style>,
    dispatcher: UpdateDispatcher,
}

impl Map {
    pub fn new(
        transform: TransformState,
        scheduler: Arc<dyn Scheduler>,
        file_source: Arc<dyn FileSource>,
        annotations: Arc<dyn AnnotationManager>,
        style: Arc<dyn Style>,
    ) -> Self {
        Self {
            transform,
            debug_options: DebugOptions::NO_DEBUG,
            prefetch: PrefetchConfig::default(),
            pixel_ratio: DEFAULT_PIXEL_RATIO,
            mode: MapMode::default(),
            scheduler,
            file_source,
            annotations,
            style,
            dispatcher: UpdateDispatcher::new(),
        }
    }

    /// Build the shared resources described by `config`: a worker pool, an HTTP
    /// file source behind the process-wide network status, and an annotation
    /// revision counter. The configured network mode is applied to the global
    /// status.
    pub fn from_config(
        config: &PipelineConfig,
        transform: TransformState,
        style: Arc<dyn Style>,
    ) -> Result<Self> {
        config.validate()?;

        let network = NetworkStatus::shared();
        network.set(config.network_mode);

        let scheduler: Arc<dyn Scheduler> = Arc::new(ThreadPool::new(&config.scheduler)?);
        let file_source = DefaultFileSource::new(&config.file_source, Arc::clone(&scheduler), network)?;

        let mut map = Self::new(
            transform,
            scheduler,
            Arc::new(file_source),
            Arc::new(AnnotationRevision::new()),
            style,
        );
        map.apply_config(config)?;
        Ok(map)
    }

    /// Take over the per-frame settings of `config`
    pub fn apply_config(&mut self, config: &PipelineConfig) -> Result<()> {
        self.set_pixel_ratio(config.pixel_ratio)?;
        self.debug_options = config.debug_options;
        self.prefetch = config.prefetch;
        self.mode = config.mode;
        Ok(())
    }

    /// Build this frame's snapshot and hand it to the style
    pub fn render_frame(&self) {
        let resources = Resources::new(
            self.scheduler.as_ref(),
            self.file_source.as_ref(),
            self.annotations.as_ref(),
            self.style.as_ref(),
        );
        let parameters = build_snapshot(
            &self.transform,
            self.debug_options,
            self.mode,
            self.prefetch,
            self.pixel_ratio,
            resources,
        );
        self.dispatcher.dispatch(&parameters);
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn zoom(&self) -> f64 {
        self.transform.zoom()
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.transform.set_zoom(zoom);
    }

    pub fn center(&self) -> LatLng {
        self.transform.center
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.transform.set_center(center);
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.transform.set_center(center);
        self.transform.set_zoom(zoom);
    }

    pub fn resize(&mut self, size: Point) {
        self.transform.set_size(size);
    }

    pub fn set_zoom_limits(&mut self, min_zoom: u8, max_zoom: u8) {
        self.transform.set_zoom_limits(min_zoom, max_zoom);
    }

    pub fn debug_options(&self) -> DebugOptions {
        self.debug_options
    }

    pub fn set_debug_options(&mut self, debug_options: DebugOptions) {
        self.debug_options = debug_options;
    }

    /// Step to the next debug overlay combination
    pub fn cycle_debug_options(&mut self) -> DebugOptions {
        self.debug_options = self.debug_options.cycle();
        self.debug_options
    }

    pub fn prefetch(&self) -> PrefetchConfig {
        self.prefetch
    }

    pub fn set_prefetch(&mut self, prefetch: PrefetchConfig) {
        self.prefetch = prefetch;
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) -> Result<()> {
        if !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
            return Err(Error::InvalidValue(format!(
                "pixel ratio must be positive, got {}",
                pixel_ratio
            )));
        }
        self.pixel_ratio = pixel_ratio;
        Ok(())
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: MapMode) {
        self.mode = mode;
    }

    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn file_source(&self) -> &Arc<dyn FileSource> {
        &self.file_source
    }

    pub fn annotations(&self) -> &Arc<dyn AnnotationManager> {
        &self.annotations
    }

    pub fn frame_count(&self) -> u64 {
        self.dispatcher.frame_count()
    }
}
