//! Bounded output store: a fixed row of slots that absorbs harvested items.

use crate::item::ItemStack;
use serde::{Deserialize, Serialize};

/// Fixed-capacity, stack-merging inventory. Slot order is stable and every
/// scan runs in ascending index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputStore {
    slots: Vec<Option<ItemStack>>,
    max_stack_size: u32,
}

impl OutputStore {
    pub fn new(slot_count: usize, max_stack_size: u32) -> Self {
        Self {
            slots: vec![None; slot_count],
            max_stack_size: max_stack_size.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn max_stack_size(&self) -> u32 {
        self.max_stack_size
    }

    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Occupied slots with their indices, in slot order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|stack| (i, stack)))
    }

    /// Total item count across all slots.
    pub fn total(&self) -> u64 {
        self.occupied().map(|(_, s)| s.quantity as u64).sum()
    }

    /// Per-slot ceiling for an item whose own stack limit is `item_limit`.
    fn cap_for(&self, item_limit: u32) -> u32 {
        self.max_stack_size.min(item_limit).max(1)
    }

    /// Insert a stack. Returns whatever did not fit, reduced in count but
    /// otherwise unchanged, or `None` if everything was absorbed.
    ///
    /// First pass tops up compatible stacks; second pass fills empty slots,
    /// each up to the per-slot ceiling.
    #[must_use = "the remainder must be routed somewhere or it is lost"]
    pub fn insert(&mut self, mut stack: ItemStack, item_limit: u32) -> Option<ItemStack> {
        if stack.is_empty() {
            return None;
        }
        let cap = self.cap_for(item_limit);

        for existing in self.slots.iter_mut().flatten() {
            if !existing.can_stack_with(&stack) {
                continue;
            }
            let transferable = stack.quantity.min(cap.saturating_sub(existing.quantity));
            if transferable > 0 {
                existing.quantity += transferable;
                stack.quantity -= transferable;
                if stack.is_empty() {
                    return None;
                }
            }
        }

        for slot in self.slots.iter_mut().filter(|s| s.is_none()) {
            let part = stack.split(cap);
            *slot = Some(part);
            if stack.is_empty() {
                return None;
            }
        }

        Some(stack)
    }

    /// Overwrite a slot directly. The count is re-clamped to the per-slot
    /// ceiling and the clamped-off excess is returned, as is the whole stack
    /// when `index` is out of range.
    #[must_use = "excess items are returned, not dropped"]
    pub fn set_slot(
        &mut self,
        index: usize,
        stack: Option<ItemStack>,
        item_limit: u32,
    ) -> Option<ItemStack> {
        let cap = self.cap_for(item_limit);
        let Some(slot) = self.slots.get_mut(index) else {
            return stack;
        };
        match stack {
            Some(mut stack) if !stack.is_empty() => {
                let excess = stack.quantity.saturating_sub(cap);
                let overflow = stack.split(excess);
                *slot = Some(stack);
                (!overflow.is_empty()).then_some(overflow)
            }
            _ => {
                *slot = None;
                None
            }
        }
    }

    /// Withdraw up to `amount` items from a slot.
    pub fn take(&mut self, index: usize, amount: u32) -> Option<ItemStack> {
        let slot = self.slots.get_mut(index)?;
        let stack = slot.as_mut()?;
        let taken = stack.split(amount);
        if stack.is_empty() {
            *slot = None;
        }
        (!taken.is_empty()).then_some(taken)
    }

    /// Empty every slot, returning the contents in slot order.
    pub fn drain(&mut self) -> Vec<ItemStack> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}
