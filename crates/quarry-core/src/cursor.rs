//! The excavation cursor: a restartable position in the layer-by-layer
//! mining pattern.
//!
//! Each layer is a square of side `2k + 1` centered under the machine,
//! walked with the X axis outermost and Z innermost. The pattern is computed
//! arithmetically from the index, so `(depth, index)` alone determines the
//! next coordinate and nothing else needs persisting.

use crate::world::BlockPos;
use serde::{Deserialize, Serialize};

/// Largest supported half-width. Keeps `side * side` inside `u32` and every
/// offset well inside `i32`.
pub const MAX_HALF_WIDTH: u32 = i16::MAX as u32;

/// Size of the per-layer pattern, as a half-width `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaTier {
    half_width: u32,
}

impl AreaTier {
    /// Half-widths above [`MAX_HALF_WIDTH`] are clamped down to it.
    pub fn new(half_width: u32) -> Self {
        Self {
            half_width: half_width.min(MAX_HALF_WIDTH),
        }
    }

    pub fn half_width(&self) -> u32 {
        self.half_width
    }

    /// Side length of the square.
    pub fn side(&self) -> u32 {
        self.half_width.saturating_mul(2).saturating_add(1)
    }

    /// Number of coordinates in one layer.
    pub fn pattern_len(&self) -> u32 {
        self.side().saturating_mul(self.side())
    }

    /// Horizontal `(dx, dz)` offset for a pattern index. Indices past the end
    /// are clamped to the last entry.
    pub fn offset_at(&self, index: u32) -> (i32, i32) {
        let index = index.min(self.pattern_len() - 1);
        let side = self.side();
        let k = self.half_width as i64;
        let dx = (index / side) as i64 - k;
        let dz = (index % side) as i64 - k;
        (saturate_i32(dx), saturate_i32(dz))
    }
}

fn saturate_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Persistent `(depth, index)` position in the excavation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExcavationCursor {
    depth: u32,
    index: u32,
}

impl Default for ExcavationCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl ExcavationCursor {
    /// Start one block below the machine at the first pattern entry.
    pub fn new() -> Self {
        Self { depth: 1, index: 0 }
    }

    /// Rebuild a cursor from raw stored values, clamping depth to at least 1
    /// and the index into the tier's pattern.
    pub fn from_raw(depth: i64, index: i64, tier: AreaTier) -> Self {
        let depth = depth.clamp(1, u32::MAX as i64) as u32;
        let index = index.clamp(0, tier.pattern_len() as i64 - 1) as u32;
        Self { depth, index }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Pull the index back into range after the tier shrank.
    pub fn clamp_to(&mut self, tier: AreaTier) {
        self.index = self.index.min(tier.pattern_len() - 1);
    }

    /// Absolute coordinate the cursor currently points at.
    pub fn target(&self, origin: BlockPos, tier: AreaTier) -> BlockPos {
        let (dx, dz) = tier.offset_at(self.index);
        BlockPos::new(
            saturate_i32(origin.x as i64 + dx as i64),
            saturate_i32(self.layer_y(origin)),
            saturate_i32(origin.z as i64 + dz as i64),
        )
    }

    /// Y level of the current layer, in wide arithmetic so deep cursors
    /// cannot wrap.
    pub fn layer_y(&self, origin: BlockPos) -> i64 {
        origin.y as i64 - self.depth as i64
    }

    /// Step to the next pattern entry. Returns `true` when that wrapped onto
    /// a new, deeper layer.
    pub fn advance(&mut self, tier: AreaTier) -> bool {
        self.index += 1;
        if self.index >= tier.pattern_len() {
            self.index = 0;
            self.depth = self.depth.saturating_add(1);
            true
        } else {
            false
        }
    }
}
