//! The host world as the quarry sees it.
//!
//! Voxel storage, drop tables and chunk loading stay on the host side; the
//! simulation only needs the narrow contract below.

use crate::fixed::Fixed64;
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};

/// An absolute block coordinate. `y` grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn up(&self) -> Self {
        self.offset(0, 1, 0)
    }
}

/// How hard a block is to break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hardness {
    Finite(Fixed64),
    /// Bedrock, barriers and the like.
    Unbreakable,
}

impl Hardness {
    pub fn is_breakable(&self) -> bool {
        match self {
            Hardness::Finite(h) => *h >= Fixed64::ZERO,
            Hardness::Unbreakable => false,
        }
    }
}

/// Read/modify access to the blocks around a quarry.
pub trait WorldAccess {
    fn is_air(&self, pos: BlockPos) -> bool;

    fn hardness(&self, pos: BlockPos) -> Hardness;

    /// Items the block at `pos` would drop when broken with `tool`.
    fn drops_for(&self, pos: BlockPos, tool: &ItemStack) -> Vec<ItemStack>;

    /// Remove the block without emitting its drops. Returns `false` when the
    /// world refuses (protected region, unloaded chunk).
    fn remove_block(&mut self, pos: BlockPos) -> bool;

    /// Lowest Y level that exists.
    fn min_depth(&self) -> i32;

    /// Whether `pos` holds another quarry.
    fn is_same_machine_kind(&self, pos: BlockPos) -> bool;
}

/// Fallback for items the output store cannot hold.
pub trait DropSink {
    fn spill(&mut self, at: BlockPos, stack: ItemStack);
}
