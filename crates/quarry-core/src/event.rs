//! Events a quarry emits while ticking.
//!
//! Events are collected into the [`TickReport`](crate::sim::TickReport) of
//! the tick that produced them. Nothing is retained between ticks.

use crate::id::ItemTypeId;
use crate::item::ItemStack;
use crate::machine::QuarryStatus;
use crate::world::BlockPos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuarryEvent {
    /// A unit of fuel was burnt.
    FuelConsumed { item_type: ItemTypeId, grant: u32 },
    /// A block was broken and its drops routed.
    BlockMined { pos: BlockPos },
    /// Drops the output store could not hold went to the drop sink.
    ItemsSpilled { stack: ItemStack, at: BlockPos },
    ToolWorn { damage: u32, max: u32 },
    ToolBroken { item_type: ItemTypeId },
    /// The cursor finished the layer at `depth` and moved one deeper.
    LayerCompleted { depth: u32 },
    StatusChanged { from: QuarryStatus, to: QuarryStatus },
}

/// Discriminant tag for event types, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    FuelConsumed,
    BlockMined,
    ItemsSpilled,
    ToolWorn,
    ToolBroken,
    LayerCompleted,
    StatusChanged,
}

impl QuarryEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            QuarryEvent::FuelConsumed { .. } => EventKind::FuelConsumed,
            QuarryEvent::BlockMined { .. } => EventKind::BlockMined,
            QuarryEvent::ItemsSpilled { .. } => EventKind::ItemsSpilled,
            QuarryEvent::ToolWorn { .. } => EventKind::ToolWorn,
            QuarryEvent::ToolBroken { .. } => EventKind::ToolBroken,
            QuarryEvent::LayerCompleted { .. } => EventKind::LayerCompleted,
            QuarryEvent::StatusChanged { .. } => EventKind::StatusChanged,
        }
    }
}
