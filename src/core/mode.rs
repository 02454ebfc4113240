//! Engine operating mode and diagnostic toggles carried through every frame

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// How the engine produces frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapMode {
    /// Continually updating map
    #[default]
    Continuous,
    /// A once-off still image of an arbitrary viewport
    Static,
    /// A once-off still image of a single tile
    Tile,
}

impl MapMode {
    /// Whether a dispatcher should expect a stream of frames in this mode
    pub fn expects_repeated_frames(&self) -> bool {
        matches!(self, Self::Continuous)
    }
}

/// Bitset of diagnostic overlays. Opaque to the pipeline; passed through as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebugOptions(u32);

impl DebugOptions {
    pub const NO_DEBUG: Self = Self(0);
    pub const TILE_BORDERS: Self = Self(1 << 1);
    pub const PARSE_STATUS: Self = Self(1 << 2);
    pub const TIMESTAMPS: Self = Self(1 << 3);
    pub const COLLISION: Self = Self(1 << 4);
    pub const OVERDRAW: Self = Self(1 << 5);
    pub const STENCIL_CLIP: Self = Self(1 << 6);
    pub const DEPTH_BUFFER: Self = Self(1 << 7);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn toggle(&mut self, other: Self) {
        self.0 ^= other.0;
    }

    /// Step through the overlays one at a time, the way a "cycle debug" key does
    pub fn cycle(&self) -> Self {
        const ORDER: [DebugOptions; 8] = [
            DebugOptions::NO_DEBUG,
            DebugOptions::TILE_BORDERS,
            DebugOptions::PARSE_STATUS,
            DebugOptions::TIMESTAMPS,
            DebugOptions::COLLISION,
            DebugOptions::OVERDRAW,
            DebugOptions::STENCIL_CLIP,
            DebugOptions::DEPTH_BUFFER,
        ];
        let next = ORDER
            .iter()
            .position(|option| *option == *self)
            .map(|index| (index + 1) % ORDER.len())
            .unwrap_or(0);
        ORDER[next]
    }
}

impl BitOr for DebugOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DebugOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_option_set_operations() {
        let mut options = DebugOptions::TILE_BORDERS | DebugOptions::COLLISION;
        assert!(options.contains(DebugOptions::TILE_BORDERS));
        assert!(!options.contains(DebugOptions::OVERDRAW));

        options.remove(DebugOptions::TILE_BORDERS);
        assert_eq!(options, DebugOptions::COLLISION);

        options.toggle(DebugOptions::COLLISION);
        assert!(options.is_empty());
    }

    #[test]
    fn test_debug_cycle_wraps() {
        assert_eq!(DebugOptions::NO_DEBUG.cycle(), DebugOptions::TILE_BORDERS);
        assert_eq!(DebugOptions::DEPTH_BUFFER.cycle(), DebugOptions::NO_DEBUG);
        let combined = DebugOptions::TILE_BORDERS | DebugOptions::OVERDRAW;
        assert_eq!(combined.cycle(), DebugOptions::NO_DEBUG);
    }

    #[test]
    fn test_map_mode_frames() {
        assert!(MapMode::Continuous.expects_repeated_frames());
        assert!(!MapMode::Static.expects_repeated_frames());
        assert!(!MapMode::Tile.expects_repeated_frames());
    }
}
