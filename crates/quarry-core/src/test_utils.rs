//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::catalog::{Catalog, CatalogBuilder, ItemTypeDef, ToolTier};
use crate::fixed::Fixed64;
use crate::id::ItemTypeId;
use crate::item::ItemStack;
use crate::world::{BlockPos, DropSink, Hardness, WorldAccess};
use std::collections::HashMap;

// ===========================================================================
// Item ids (registration order of `test_catalog`)
// ===========================================================================

pub fn cobblestone() -> ItemTypeId {
    ItemTypeId(0)
}
pub fn dirt() -> ItemTypeId {
    ItemTypeId(1)
}
pub fn coal() -> ItemTypeId {
    ItemTypeId(2)
}
pub fn charcoal() -> ItemTypeId {
    ItemTypeId(3)
}
pub fn stick() -> ItemTypeId {
    ItemTypeId(4)
}
pub fn bucket() -> ItemTypeId {
    ItemTypeId(5)
}
pub fn lava_bucket() -> ItemTypeId {
    ItemTypeId(6)
}
pub fn coal_block() -> ItemTypeId {
    ItemTypeId(7)
}
/// Stacks to 16.
pub fn snowball() -> ItemTypeId {
    ItemTypeId(8)
}

// Pickaxes
pub fn wooden_pickaxe() -> ItemTypeId {
    ItemTypeId(9)
}
pub fn stone_pickaxe() -> ItemTypeId {
    ItemTypeId(10)
}
pub fn iron_pickaxe() -> ItemTypeId {
    ItemTypeId(11)
}
pub fn golden_pickaxe() -> ItemTypeId {
    ItemTypeId(12)
}
pub fn diamond_pickaxe() -> ItemTypeId {
    ItemTypeId(13)
}
pub fn netherite_pickaxe() -> ItemTypeId {
    ItemTypeId(14)
}

/// Catalog whose ids match the functions above.
pub fn test_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    let defs = [
        ItemTypeDef::new("cobblestone"),
        ItemTypeDef::new("dirt"),
        ItemTypeDef::new("coal").fuel(8),
        ItemTypeDef::new("charcoal").fuel(8),
        ItemTypeDef::new("stick").fuel(1),
        ItemTypeDef::new("bucket").max_stack(16),
        ItemTypeDef::new("lava_bucket")
            .fuel(100)
            .remainder(bucket())
            .max_stack(1),
        ItemTypeDef::new("coal_block").fuel(80),
        ItemTypeDef::new("snowball").max_stack(16),
        ItemTypeDef::new("wooden_pickaxe").tool(ToolTier::Wood, 59),
        ItemTypeDef::new("stone_pickaxe").tool(ToolTier::Stone, 131),
        ItemTypeDef::new("iron_pickaxe").tool(ToolTier::Iron, 250),
        ItemTypeDef::new("golden_pickaxe").tool(ToolTier::Gold, 32),
        ItemTypeDef::new("diamond_pickaxe").tool(ToolTier::Diamond, 1561),
        ItemTypeDef::new("netherite_pickaxe").tool(ToolTier::Netherite, 2031),
    ];
    for def in defs {
        b.register(def).unwrap();
    }
    b.build().unwrap()
}

// ===========================================================================
// In-memory world
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestBlock {
    /// Breakable block that drops `count` of `drop`.
    Solid {
        drop: ItemTypeId,
        count: u32,
        hardness: Fixed64,
    },
    Bedrock,
    /// Another quarry.
    Quarry,
    /// Breakable-looking, but the world refuses to remove it.
    Protected,
}

impl TestBlock {
    pub fn stone() -> Self {
        TestBlock::Solid {
            drop: cobblestone(),
            count: 1,
            hardness: Fixed64::from_num(1.5),
        }
    }

    pub fn ore(drop: ItemTypeId, count: u32) -> Self {
        TestBlock::Solid {
            drop,
            count,
            hardness: Fixed64::from_num(3),
        }
    }
}

/// Sparse voxel world. Anything not set is air.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWorld {
    blocks: HashMap<BlockPos, TestBlock>,
    min_depth: i32,
    spilled: Vec<(BlockPos, ItemStack)>,
    removed: u64,
}

impl GridWorld {
    pub fn new(min_depth: i32) -> Self {
        Self {
            blocks: HashMap::new(),
            min_depth,
            spilled: Vec::new(),
            removed: 0,
        }
    }

    pub fn set(&mut self, pos: BlockPos, block: TestBlock) {
        self.blocks.insert(pos, block);
    }

    pub fn get(&self, pos: BlockPos) -> Option<&TestBlock> {
        self.blocks.get(&pos)
    }

    pub fn is_air_at(&self, pos: BlockPos) -> bool {
        !self.blocks.contains_key(&pos)
    }

    pub fn spilled(&self) -> &[(BlockPos, ItemStack)] {
        &self.spilled
    }

    /// Total items spilled so far.
    pub fn spilled_total(&self) -> u64 {
        self.spilled.iter().map(|(_, s)| s.quantity as u64).sum()
    }

    /// Blocks removed so far.
    pub fn removed(&self) -> u64 {
        self.removed
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

impl WorldAccess for GridWorld {
    fn is_air(&self, pos: BlockPos) -> bool {
        self.is_air_at(pos)
    }

    fn hardness(&self, pos: BlockPos) -> Hardness {
        match self.blocks.get(&pos) {
            Some(TestBlock::Solid { hardness, .. }) => Hardness::Finite(*hardness),
            Some(TestBlock::Bedrock) => Hardness::Unbreakable,
            Some(TestBlock::Quarry) => Hardness::Finite(Fixed64::from_num(3.5)),
            Some(TestBlock::Protected) => Hardness::Finite(Fixed64::from_num(2)),
            None => Hardness::Finite(Fixed64::ZERO),
        }
    }

    fn drops_for(&self, pos: BlockPos, _tool: &ItemStack) -> Vec<ItemStack> {
        match self.blocks.get(&pos) {
            Some(TestBlock::Solid { drop, count, .. }) => vec![ItemStack::new(*drop, *count)],
            _ => Vec::new(),
        }
    }

    fn remove_block(&mut self, pos: BlockPos) -> bool {
        match self.blocks.get(&pos) {
            Some(TestBlock::Protected) | None => false,
            Some(_) => {
                self.blocks.remove(&pos);
                self.removed += 1;
                true
            }
        }
    }

    fn min_depth(&self) -> i32 {
        self.min_depth
    }

    fn is_same_machine_kind(&self, pos: BlockPos) -> bool {
        matches!(self.blocks.get(&pos), Some(TestBlock::Quarry))
    }
}

impl DropSink for GridWorld {
    fn spill(&mut self, at: BlockPos, stack: ItemStack) {
        self.spilled.push((at, stack));
    }
}

// ===========================================================================
// World builders
// ===========================================================================

/// Fill layers `1..=depth` below `origin` with `block` over a square of the
/// given half-width.
pub fn fill_layers(
    world: &mut GridWorld,
    origin: BlockPos,
    half_width: i32,
    depth: i32,
    block: TestBlock,
) {
    for dy in 1..=depth {
        for dx in -half_width..=half_width {
            for dz in -half_width..=half_width {
                world.set(origin.offset(dx, -dy, dz), block.clone());
            }
        }
    }
}

/// A world with `depth` layers of stone under `origin`, floor at y = 0.
pub fn stone_world(origin: BlockPos, half_width: i32, depth: i32) -> GridWorld {
    let mut world = GridWorld::new(0);
    fill_layers(&mut world, origin, half_width, depth, TestBlock::stone());
    world
}
