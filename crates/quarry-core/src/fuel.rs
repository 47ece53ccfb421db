//! Fuel ledger: how many more blocks the machine may break, and how much the
//! last consumed fuel item granted (for the fuel gauge).

use crate::catalog::ItemClassification;
use crate::fixed::{Fixed64, ratio};
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuelLedger {
    remaining: u32,
    last_grant: u32,
}

impl FuelLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a ledger from stored values.
    pub fn from_parts(remaining: u32, last_grant: u32) -> Self {
        Self {
            remaining,
            last_grant,
        }
    }

    /// Blocks still minable with the fuel already burnt.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn last_grant(&self) -> u32 {
        self.last_grant
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Burn one unit from `fuel_slot`.
    ///
    /// On success the item's value is added to the budget and recorded as
    /// the last grant. When the unit was the last one and the item leaves a
    /// remainder, the remainder takes its place in the slot. Unknown or
    /// absent fuel clears the last grant and returns `false`.
    ///
    /// The caller only invokes this once the budget is exhausted.
    pub fn try_refuel<C: ItemClassification + ?Sized>(
        &mut self,
        fuel_slot: &mut Option<ItemStack>,
        catalog: &C,
    ) -> bool {
        let gained = fuel_slot
            .as_ref()
            .filter(|stack| !stack.is_empty())
            .map_or(0, |stack| catalog.fuel_value(stack.item_type));

        let Some(stack) = fuel_slot.as_mut().filter(|_| gained > 0) else {
            self.last_grant = 0;
            return false;
        };

        let fuel_item = stack.item_type;
        stack.quantity -= 1;
        if stack.is_empty() {
            *fuel_slot = catalog
                .recipe_remainder(fuel_item)
                .map(|rem| ItemStack::new(rem, 1));
        }

        self.remaining = self.remaining.saturating_add(gained);
        self.last_grant = gained;
        true
    }

    /// Pay for one broken block. Never goes below zero.
    pub fn consume_block(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Remaining budget relative to the last grant, clamped to `0..=1`.
    pub fn fraction(&self) -> Fixed64 {
        ratio(self.remaining, self.last_grant)
    }
}
