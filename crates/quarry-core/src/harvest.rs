//! Harvest execution: break one block, route its drops, wear the tool.

use crate::catalog::ItemClassification;
use crate::event::QuarryEvent;
use crate::item::ItemStack;
use crate::store::OutputStore;
use crate::tool::{ToolWear, wear_tool};
use crate::world::{BlockPos, DropSink, WorldAccess};
use tracing::debug;

/// Break `target` with the tool in `tool_slot`.
///
/// Drops are computed before removal and routed by hand: into `store`
/// first, and whatever does not fit is spilled at `spill_at`. Returns
/// `false` without touching the tool when the slot is empty or the world
/// refuses the removal.
pub fn harvest<W, C>(
    world: &mut W,
    catalog: &C,
    target: BlockPos,
    spill_at: BlockPos,
    tool_slot: &mut Option<ItemStack>,
    store: &mut OutputStore,
    events: &mut Vec<QuarryEvent>,
) -> bool
where
    W: WorldAccess + DropSink + ?Sized,
    C: ItemClassification + ?Sized,
{
    let Some(tool) = tool_slot.as_ref() else {
        return false;
    };

    let drops = world.drops_for(target, tool);
    if !world.remove_block(target) {
        debug!(?target, "world rejected block removal");
        return false;
    }

    for drop in drops.into_iter().filter(|d| !d.is_empty()) {
        let limit = catalog.max_stack_size(drop.item_type);
        if let Some(rest) = store.insert(drop, limit) {
            debug!(item = ?rest.item_type, quantity = rest.quantity, "output full, spilling");
            events.push(QuarryEvent::ItemsSpilled {
                stack: rest.clone(),
                at: spill_at,
            });
            world.spill(spill_at, rest);
        }
    }

    let tool_type = tool.item_type;
    match wear_tool(catalog, tool_slot) {
        Some(ToolWear::Worn { damage, max }) => {
            events.push(QuarryEvent::ToolWorn { damage, max });
        }
        Some(ToolWear::Broken) => {
            debug!(item = ?tool_type, "tool broke");
            events.push(QuarryEvent::ToolBroken {
                item_type: tool_type,
            });
        }
        Some(ToolWear::Unbreakable) | None => {}
    }

    true
}
