use crate::fixed::Fixed64;
use crate::id::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stack of items of one type, with the wear counter and attached data
/// that make two stacks distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_type: ItemTypeId,
    pub quantity: u32,
    /// Durability already used up. Only meaningful for damageable items.
    #[serde(default)]
    pub damage: u32,
    /// Per-stack attached data (enchantment level, custom name hash, ...).
    /// Stacks only merge when this map is identical.
    #[serde(default)]
    pub properties: BTreeMap<PropertyId, Fixed64>,
}

impl ItemStack {
    pub fn new(item_type: ItemTypeId, quantity: u32) -> Self {
        Self {
            item_type,
            quantity,
            damage: 0,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style setter for the wear counter.
    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn set_property(&mut self, id: PropertyId, value: Fixed64) {
        self.properties.insert(id, value);
    }

    pub fn get_property(&self, id: PropertyId) -> Option<Fixed64> {
        self.properties.get(&id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Whether `other` may be merged into this stack: same item, same wear,
    /// same attached data. Quantity is ignored.
    pub fn can_stack_with(&self, other: &ItemStack) -> bool {
        self.item_type == other.item_type
            && self.damage == other.damage
            && self.properties == other.properties
    }

    /// Copy of this stack with a different quantity.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Take up to `amount` items off this stack. Returns the taken part,
    /// which is empty when `amount` is zero or the stack already was.
    #[must_use = "the split-off items are returned, not dropped"]
    pub fn split(&mut self, amount: u32) -> ItemStack {
        let taken = amount.min(self.quantity);
        self.quantity -= taken;
        self.with_quantity(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_takes_at_most_available() {
        let mut stack = ItemStack::new(ItemTypeId(0), 5);
        let taken = stack.split(8);
        assert_eq!(taken.quantity, 5);
        assert!(stack.is_empty());
    }

    #[test]
    fn split_keeps_identity() {
        let mut stack = ItemStack::new(ItemTypeId(3), 10).with_damage(2);
        let taken = stack.split(4);
        assert_eq!(taken.item_type, ItemTypeId(3));
        assert_eq!(taken.damage, 2);
        assert_eq!(stack.quantity, 6);
    }

    #[test]
    fn stacking_requires_same_wear() {
        let fresh = ItemStack::new(ItemTypeId(1), 1);
        let worn = ItemStack::new(ItemTypeId(1), 1).with_damage(3);
        assert!(!fresh.can_stack_with(&worn));
        assert!(fresh.can_stack_with(&ItemStack::new(ItemTypeId(1), 40)));
    }

    #[test]
    fn stacking_requires_same_properties() {
        let plain = ItemStack::new(ItemTypeId(0), 1);
        let mut tagged = ItemStack::new(ItemTypeId(0), 1);
        tagged.set_property(PropertyId(0), Fixed64::from_num(3));
        assert!(!plain.can_stack_with(&tagged));
        assert_eq!(tagged.get_property(PropertyId(0)), Some(Fixed64::from_num(3)));
        assert_eq!(tagged.get_property(PropertyId(1)), None);
    }

    #[test]
    fn different_items_never_stack() {
        let a = ItemStack::new(ItemTypeId(0), 1);
        let b = ItemStack::new(ItemTypeId(1), 1);
        assert!(!a.can_stack_with(&b));
    }
}
