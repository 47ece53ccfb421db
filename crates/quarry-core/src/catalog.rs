//! Item classification: which items are mining tools, which are fuel, and
//! the stacking and durability limits the simulation needs.
//!
//! The simulation only ever talks to the [`ItemClassification`] trait. The
//! [`Catalog`] is the stock implementation, built once through a
//! [`CatalogBuilder`] and immutable afterwards.

use crate::id::ItemTypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default stack limit for items that do not declare one.
pub const DEFAULT_MAX_STACK: u32 = 64;

// ---------------------------------------------------------------------------
// Tool tiers
// ---------------------------------------------------------------------------

/// Rank of a valid mining tool. Determines how many ticks one block takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolTier {
    Wood,
    Stone,
    Iron,
    /// Soft but fast: trades durability for speed.
    Gold,
    Diamond,
    Netherite,
}

impl ToolTier {
    pub const ALL: [ToolTier; 6] = [
        ToolTier::Wood,
        ToolTier::Stone,
        ToolTier::Iron,
        ToolTier::Gold,
        ToolTier::Diamond,
        ToolTier::Netherite,
    ];

    /// Ticks needed to break one block with a tool of this tier.
    pub fn ticks_per_block(self) -> u32 {
        match self {
            ToolTier::Wood => 200,
            ToolTier::Stone => 160,
            ToolTier::Iron => 120,
            ToolTier::Gold => 20,
            ToolTier::Diamond => 80,
            ToolTier::Netherite => 40,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification trait
// ---------------------------------------------------------------------------

/// Pure lookups the simulation needs about an item type.
///
/// Unknown item types must map to "not a tool", zero fuel and no remainder
/// rather than failing.
pub trait ItemClassification {
    /// Tool tier, or `None` when the item cannot drive the quarry.
    fn tool_tier(&self, item: ItemTypeId) -> Option<ToolTier>;

    /// Blocks one unit of this item pays for. Zero means "not fuel".
    fn fuel_value(&self, item: ItemTypeId) -> u32;

    /// Item left behind once a unit of fuel is used up (bucket from a
    /// lava bucket).
    fn recipe_remainder(&self, item: ItemTypeId) -> Option<ItemTypeId>;

    /// Largest stack this item forms.
    fn max_stack_size(&self, _item: ItemTypeId) -> u32 {
        DEFAULT_MAX_STACK
    }

    /// Uses before the item breaks. `None` for items that do not wear.
    fn max_durability(&self, _item: ItemTypeId) -> Option<u32> {
        None
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// An item type definition in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTypeDef {
    pub name: String,
    pub max_stack_size: u32,
    pub max_durability: Option<u32>,
    pub tool_tier: Option<ToolTier>,
    pub fuel_value: u32,
    pub remainder: Option<ItemTypeId>,
}

impl ItemTypeDef {
    /// A plain, stackable, non-tool, non-fuel item.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            max_stack_size: DEFAULT_MAX_STACK,
            max_durability: None,
            tool_tier: None,
            fuel_value: 0,
            remainder: None,
        }
    }

    /// Mark as a mining tool. Tools never stack.
    pub fn tool(mut self, tier: ToolTier, durability: u32) -> Self {
        self.tool_tier = Some(tier);
        self.max_durability = Some(durability);
        self.max_stack_size = 1;
        self
    }

    pub fn fuel(mut self, blocks: u32) -> Self {
        self.fuel_value = blocks;
        self
    }

    pub fn remainder(mut self, item: ItemTypeId) -> Self {
        self.remainder = Some(item);
        self
    }

    pub fn max_stack(mut self, size: u32) -> Self {
        self.max_stack_size = size;
        self
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for an immutable [`Catalog`]. Item ids are handed out in
/// registration order, starting at zero.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    items: Vec<ItemTypeDef>,
    name_to_id: HashMap<String, ItemTypeId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next registered item will receive.
    pub fn next_id(&self) -> ItemTypeId {
        ItemTypeId(self.items.len() as u32)
    }

    /// Register an item type. Returns its ID.
    pub fn register(&mut self, def: ItemTypeDef) -> Result<ItemTypeId, CatalogError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(CatalogError::DuplicateName(def.name));
        }
        let id = self.next_id();
        self.name_to_id.insert(def.name.clone(), id);
        self.items.push(def);
        Ok(id)
    }

    /// Lookup item type ID by name.
    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Freeze the catalog. Every remainder must point at a registered item.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        for def in &self.items {
            if let Some(rem) = def.remainder {
                if rem.0 as usize >= self.items.len() {
                    return Err(CatalogError::InvalidItemRef(rem));
                }
            }
        }
        Ok(Catalog {
            items: self.items,
            name_to_id: self.name_to_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable item catalog. Frozen after build(). Thread-safe to share.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<ItemTypeDef>,
    name_to_id: HashMap<String, ItemTypeId>,
}

impl Catalog {
    pub fn get_item(&self, id: ItemTypeId) -> Option<&ItemTypeDef> {
        self.items.get(id.0 as usize)
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// All items that can drive the quarry, in id order.
    pub fn tools(&self) -> impl Iterator<Item = (ItemTypeId, ToolTier)> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, def)| def.tool_tier.map(|t| (ItemTypeId(i as u32), t)))
    }
}

impl ItemClassification for Catalog {
    fn tool_tier(&self, item: ItemTypeId) -> Option<ToolTier> {
        self.get_item(item).and_then(|def| def.tool_tier)
    }

    fn fuel_value(&self, item: ItemTypeId) -> u32 {
        self.get_item(item).map_or(0, |def| def.fuel_value)
    }

    fn recipe_remainder(&self, item: ItemTypeId) -> Option<ItemTypeId> {
        self.get_item(item).and_then(|def| def.remainder)
    }

    fn max_stack_size(&self, item: ItemTypeId) -> u32 {
        self.get_item(item)
            .map_or(DEFAULT_MAX_STACK, |def| def.max_stack_size)
    }

    fn max_durability(&self, item: ItemTypeId) -> Option<u32> {
        self.get_item(item).and_then(|def| def.max_durability)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate item name: {0}")]
    DuplicateName(String),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemTypeId),
}
