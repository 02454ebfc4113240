use crate::update::UpdateParameters;
use instant::Instant;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Hands each frame's [`UpdateParameters`] to the style
///
/// Dispatch runs synchronously on the calling thread and returns as soon as the
/// style's `update` returns. Tile I/O started by the style continues on the
/// scheduler afterwards.
#[derive(Debug)]
pub struct UpdateDispatcher {
    frames: AtomicU64,
    last_dispatch: Mutex<Option<Instant>>,
}

impl UpdateDispatcher {
    pub fn new() -> Self {
        Self {
            frames: AtomicU64::new(0),
            last_dispatch: Mutex::new(None),
        }
    }

    /// Forward `parameters` to the style they carry
    pub fn dispatch(&self, parameters: &UpdateParameters<'_>) {
        let frame = self.frames.fetch_add(1, Ordering::AcqRel) + 1;
        let now = Instant::now();
        let since_last = self
            .last_dispatch
            .lock()
            .ok()
            .and_then(|mut last| last.replace(now))
            .map(|previous| now.duration_since(previous));

        if frame > 1 && !parameters.mode().expects_repeated_frames() {
            log::debug!(
                "frame {} dispatched again in {:?} mode",
                frame,
                parameters.mode()
            );
        }
        log::trace!(
            "dispatch frame {} at zoom {:.2} (plan {:?}, since last {:?})",
            frame,
            parameters.transform_state().zoom(),
            parameters.prefetch_plan(),
            since_last
        );

        parameters.style().update(parameters);
    }

    /// Frames dispatched so far
    pub fn frame_count(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Time since the most recent dispatch, if any
    pub fn since_last_dispatch(&self) -> Option<Duration> {
        self.last_dispatch
            .lock()
            .ok()
            .and_then(|last| *last)
            .map(|last| last.elapsed())
    }
}

impl Default for UpdateDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mode::{DebugOptions, MapMode};
    use crate::core::transform::TransformState;
    use crate::tiles::prefetch::PrefetchConfig;
    use crate::update::test_support::Fixture;

    #[test]
    fn test_dispatch_forwards_to_style() {
        let fixture = Fixture::default();
        let transform = TransformState::default();
        let dispatcher = UpdateDispatcher::new();
        let params = UpdateParameters::builder(&transform, fixture.resources())
            .pixel_ratio(2.0)
            .debug_options(DebugOptions::COLLISION)
            .build();

        assert!(dispatcher.since_last_dispatch().is_none());
        dispatcher.dispatch(&params);
        dispatcher.dispatch(&params);

        let frames = fixture.style.frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0, 2.0);
        assert_eq!(frames[0].1, DebugOptions::COLLISION);
        assert_eq!(dispatcher.frame_count(), 2);
        assert!(dispatcher.since_last_dispatch().is_some());
    }

    #[test]
    fn test_dispatch_leaves_snapshot_unchanged() {
        let fixture = Fixture::default();
        let transform = TransformState::default();
        let params = UpdateParameters::builder(&transform, fixture.resources())
            .pixel_ratio(3.0)
            .debug_options(DebugOptions::OVERDRAW | DebugOptions::TIMESTAMPS)
            .mode(MapMode::Tile)
            .prefetch(PrefetchConfig::fixed(5))
            .build();

        UpdateDispatcher::new().dispatch(&params);

        assert_eq!(params.pixel_ratio(), 3.0);
        assert_eq!(
            params.debug_options(),
            DebugOptions::OVERDRAW | DebugOptions::TIMESTAMPS
        );
        assert_eq!(params.mode(), MapMode::Tile);
        assert_eq!(params.prefetch_config(), PrefetchConfig::fixed(5));
        assert_eq!(params.transform_state(), &TransformState::default());
    }
}
