//! Data-driven setup for quarries: the item catalog and machine
//! configuration, read from RON, TOML or JSON files.

pub mod loader;
pub mod schema;

pub use loader::{
    DataLoadError, QuarryData, load_catalog, load_config, load_quarry_data, standard_catalog,
};
