//! Choice of the extra zoom level to request ahead of the visible one
//!
//! The planner never fails. A fixed prefetch zoom, when set, is used as is;
//! otherwise the floored current zoom is shifted by the dynamic delta and
//! clamped into the source's zoom range. Negative deltas prefetch lower-detail
//! ancestors, a zero delta prefetches nothing beyond the visible tiles.

use crate::core::constants::{DEFAULT_DYNAMIC_PREFETCH_ZOOM_DELTA, MAX_ZOOM, MIN_ZOOM};
use crate::core::transform::TransformState;
use serde::{Deserialize, Serialize};

/// Prefetch strategy carried by every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Pins prefetching to one level. `None` or `Some(0)` means dynamic.
    pub fixed_prefetch_zoom: Option<u8>,
    /// Offset from the floored current zoom when no fixed level is set
    pub dynamic_prefetch_zoom_delta: i32,
}

impl PrefetchConfig {
    /// Dynamic prefetching `delta` levels away from the current zoom
    pub fn dynamic(delta: i32) -> Self {
        Self {
            fixed_prefetch_zoom: None,
            dynamic_prefetch_zoom_delta: delta,
        }
    }

    /// Always prefetch `zoom`
    pub fn fixed(zoom: u8) -> Self {
        Self {
            fixed_prefetch_zoom: Some(zoom),
            ..Self::default()
        }
    }

    /// No prefetching beyond the visible tiles
    pub fn disabled() -> Self {
        Self::dynamic(0)
    }

    /// The fixed level, if one is in effect
    pub fn effective_fixed_zoom(&self) -> Option<u8> {
        self.fixed_prefetch_zoom.filter(|zoom| *zoom > 0)
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self::dynamic(DEFAULT_DYNAMIC_PREFETCH_ZOOM_DELTA)
    }
}

/// Inclusive zoom range a tile source can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl ZoomRange {
    /// Swapped bounds are reordered
    pub fn new(min: u8, max: u8) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn clamp(&self, zoom: i64) -> u8 {
        zoom.clamp(self.min as i64, self.max as i64) as u8
    }

    pub fn contains(&self, zoom: u8) -> bool {
        (self.min..=self.max).contains(&zoom)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::new(MIN_ZOOM, MAX_ZOOM)
    }
}

/// Zoom levels to request for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchPlan {
    /// Integer zoom of the tiles needed for the visible view
    pub ideal_zoom: u8,
    /// The single extra level to request
    pub prefetch_zoom: u8,
}

impl PrefetchPlan {
    /// Whether the prefetch level asks for anything the view does not already need
    pub fn has_extra_zoom(&self) -> bool {
        self.prefetch_zoom != self.ideal_zoom
    }

    /// Prefetch is of lower-detail ancestors rather than descendants
    pub fn is_ancestor_prefetch(&self) -> bool {
        self.prefetch_zoom < self.ideal_zoom
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchPlanner {
    range: ZoomRange,
}

impl PrefetchPlanner {
    pub fn new(range: ZoomRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> ZoomRange {
        self.range
    }

    /// Effective prefetch zoom for `current_zoom`
    pub fn prefetch_zoom(&self, config: &PrefetchConfig, current_zoom: f64) -> u8 {
        if let Some(fixed) = config.effective_fixed_zoom() {
            return fixed;
        }
        let floored = floor_zoom(current_zoom);
        self.range
            .clamp(floored.saturating_add(config.dynamic_prefetch_zoom_delta as i64))
    }

    pub fn plan(&self, config: &PrefetchConfig, current_zoom: f64) -> PrefetchPlan {
        PrefetchPlan {
            ideal_zoom: self.range.clamp(floor_zoom(current_zoom)),
            prefetch_zoom: self.prefetch_zoom(config, current_zoom),
        }
    }

    /// Plan against a transform state, using its own zoom limits
    pub fn plan_for(config: &PrefetchConfig, state: &TransformState) -> PrefetchPlan {
        Self::new(state.zoom_range()).plan(config, state.zoom())
    }
}

fn floor_zoom(zoom: f64) -> i64 {
    if zoom.is_finite() {
        zoom.floor() as i64
    } else if zoom == f64::INFINITY {
        i64::MAX
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};

    fn planner() -> PrefetchPlanner {
        PrefetchPlanner::new(ZoomRange::new(0, 22))
    }

    #[test]
    fn test_dynamic_delta_floors_then_offsets() {
        let zoom = planner().prefetch_zoom(&PrefetchConfig::dynamic(-4), 10.7);
        assert_eq!(zoom, 6);
    }

    #[test]
    fn test_dynamic_delta_clamps_to_min_zoom() {
        let zoom = planner().prefetch_zoom(&PrefetchConfig::dynamic(-10), 2.0);
        assert_eq!(zoom, 0);
    }

    #[test]
    fn test_dynamic_delta_clamps_to_max_zoom() {
        let planner = PrefetchPlanner::new(ZoomRange::new(0, 14));
        assert_eq!(planner.prefetch_zoom(&PrefetchConfig::dynamic(6), 12.2), 14);
    }

    #[test]
    fn test_fixed_zoom_wins() {
        let config = PrefetchConfig {
            fixed_prefetch_zoom: Some(5),
            dynamic_prefetch_zoom_delta: 3,
        };
        assert_eq!(planner().prefetch_zoom(&config, 18.0), 5);
        assert_eq!(planner().prefetch_zoom(&config, 0.0), 5);
    }

    #[test]
    fn test_fixed_zero_means_dynamic() {
        let config = PrefetchConfig {
            fixed_prefetch_zoom: Some(0),
            dynamic_prefetch_zoom_delta: 2,
        };
        assert_eq!(planner().prefetch_zoom(&config, 7.5), 9);
    }

    #[test]
    fn test_zero_delta_has_no_extra_zoom() {
        let plan = planner().plan(&PrefetchConfig::disabled(), 11.9);
        assert_eq!(plan.prefetch_zoom, 11);
        assert_eq!(plan.ideal_zoom, 11);
        assert!(!plan.has_extra_zoom());
    }

    #[test]
    fn test_clamp_property_over_grid() {
        let range = ZoomRange::new(0, 22);
        let planner = PrefetchPlanner::new(range);
        for tenth in 0..=220 {
            let zoom = tenth as f64 / 10.0;
            for delta in -25..=25 {
                let expected = (zoom.floor() as i64 + delta as i64).clamp(0, 22) as u8;
                let actual = planner.prefetch_zoom(&PrefetchConfig::dynamic(delta), zoom);
                assert_eq!(actual, expected, "zoom {zoom} delta {delta}");
            }
        }
    }

    #[test]
    fn test_plan_for_uses_state_limits() {
        let mut state = TransformState::new(LatLng::default(), 10.7, Point::new(800.0, 600.0));
        state.set_zoom_limits(3, 12);

        let plan = PrefetchPlanner::plan_for(&PrefetchConfig::dynamic(-9), &state);
        assert_eq!(plan.ideal_zoom, 10);
        assert_eq!(plan.prefetch_zoom, 3);
        assert!(plan.is_ancestor_prefetch());
    }

    #[test]
    fn test_extreme_delta_does_not_overflow() {
        assert_eq!(planner().prefetch_zoom(&PrefetchConfig::dynamic(i32::MAX), 22.0), 22);
        assert_eq!(planner().prefetch_zoom(&PrefetchConfig::dynamic(i32::MIN), 0.0), 0);
    }
}
