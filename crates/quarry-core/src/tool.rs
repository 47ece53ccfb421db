//! Tool policy: validity, mining speed and wear of the tool in the tool slot.

use crate::catalog::ItemClassification;
use crate::item::ItemStack;

/// What one use did to the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolWear {
    /// The item does not take damage.
    Unbreakable,
    /// Damage went up by one and the tool survives.
    Worn { damage: u32, max: u32 },
    /// Durability ran out; the slot is now empty.
    Broken,
}

pub fn is_valid_tool<C: ItemClassification + ?Sized>(catalog: &C, tool: Option<&ItemStack>) -> bool {
    tool.is_some_and(|stack| !stack.is_empty() && catalog.tool_tier(stack.item_type).is_some())
}

/// Ticks to break one block with `tool`. Zero means "no valid tool".
pub fn ticks_per_block<C: ItemClassification + ?Sized>(catalog: &C, tool: Option<&ItemStack>) -> u32 {
    match tool {
        Some(stack) if !stack.is_empty() => catalog
            .tool_tier(stack.item_type)
            .map_or(0, |tier| tier.ticks_per_block()),
        _ => 0,
    }
}

/// Apply one use of wear to the tool in `slot`, removing it when its
/// durability runs out. Returns `None` when the slot is empty.
pub fn wear_tool<C: ItemClassification + ?Sized>(
    catalog: &C,
    slot: &mut Option<ItemStack>,
) -> Option<ToolWear> {
    let tool = slot.as_mut()?;
    let Some(max) = catalog.max_durability(tool.item_type) else {
        return Some(ToolWear::Unbreakable);
    };
    let next = tool.damage.saturating_add(1);
    if next >= max {
        *slot = None;
        Some(ToolWear::Broken)
    } else {
        tool.damage = next;
        Some(ToolWear::Worn { damage: next, max })
    }
}
