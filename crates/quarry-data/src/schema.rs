//! Serde data file structs for quarry content definitions.
//!
//! These structs define the on-disk format for items. They are deserialized
//! from RON, JSON, or TOML data files and then resolved into a
//! [`Catalog`] by [`build_catalog`].

use crate::loader::{DataLoadError, check_duplicate, resolve_name};
use quarry_core::catalog::{Catalog, CatalogBuilder, ItemTypeDef, ToolTier};
use quarry_core::id::ItemTypeId;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

// ===========================================================================
// Items
// ===========================================================================

/// An item type definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    /// Falls back to the catalog default (64, or 1 for tools).
    #[serde(default)]
    pub max_stack_size: Option<u32>,
    #[serde(default)]
    pub tool: Option<ToolData>,
    /// Blocks mined per item burnt. Zero means not a fuel.
    #[serde(default)]
    pub fuel: u32,
    /// Name of the item left behind after this one is burnt.
    #[serde(default)]
    pub remainder: Option<String>,
}

/// Mining tool properties of an item.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ToolData {
    pub tier: ToolTier,
    pub durability: u32,
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Resolve item definitions into a catalog. Ids follow list order, so a
/// remainder may name an item declared later in the file.
pub fn build_catalog(items: &[ItemData], file: &Path) -> Result<Catalog, DataLoadError> {
    let mut ids: HashMap<String, ItemTypeId> = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        check_duplicate(&ids, &item.name, file)?;
        ids.insert(item.name.clone(), ItemTypeId(i as u32));
    }

    let mut builder = CatalogBuilder::new();
    for item in items {
        let mut def = ItemTypeDef::new(&item.name);
        if let Some(tool) = item.tool {
            def = def.tool(tool.tier, tool.durability);
        }
        if item.fuel > 0 {
            def = def.fuel(item.fuel);
        }
        if let Some(name) = &item.remainder {
            def = def.remainder(*resolve_name(&ids, name, file, "item")?);
        }
        if let Some(size) = item.max_stack_size {
            def = def.max_stack(size);
        }
        builder.register(def)?;
    }
    Ok(builder.build()?)
}
