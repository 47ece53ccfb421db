//! Resolution pipeline: reads data files, resolves item references, builds
//! the catalog and the machine configuration.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and deserialization
//! helpers used by the higher-level loading pipeline.

use crate::schema::{ItemData, build_catalog};
use quarry_core::catalog::{Catalog, CatalogError};
use quarry_core::config::QuarryConfig;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base name of the item catalog file.
pub const ITEMS_FILE: &str = "items";
/// Base name of the machine configuration file.
pub const CONFIG_FILE: &str = "quarry";

const STANDARD_ITEMS: &str = include_str!("../data/standard_items.ron");

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The resolved items did not form a valid catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(file: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: file.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Deserialize in-memory `content` in the given format. `file` only labels
/// errors.
pub fn parse_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(file, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(file, e)),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(file, e)),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format, path)
}

/// Deserialize a list from a file. RON and JSON hold a bare list; TOML needs
/// a top-level table, so the list is read from the array at `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    if format != Format::Toml {
        return parse_str(&content, format, path);
    }

    let mut table: toml::Table = parse_str(&content, format, path)?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Loading pipeline
// ===========================================================================

/// Everything a host needs to run quarries from a data directory.
#[derive(Debug, Clone)]
pub struct QuarryData {
    pub catalog: Catalog,
    pub config: QuarryConfig,
}

/// Load `items.{ron,toml,json}` from `dir` and build the catalog.
pub fn load_catalog(dir: &Path) -> Result<Catalog, DataLoadError> {
    let path = require_data_file(dir, ITEMS_FILE)?;
    let items: Vec<ItemData> = deserialize_list(&path, "items")?;
    let catalog = build_catalog(&items, &path)?;
    debug!(file = %path.display(), items = catalog.item_count(), "loaded item catalog");
    Ok(catalog)
}

/// Load `quarry.{ron,toml,json}` from `dir`. A missing file yields the
/// default configuration; fields the file omits keep their defaults.
pub fn load_config(dir: &Path) -> Result<QuarryConfig, DataLoadError> {
    match find_data_file(dir, CONFIG_FILE)? {
        Some(path) => {
            let config: QuarryConfig = deserialize_file(&path)?;
            debug!(file = %path.display(), ?config, "loaded quarry config");
            Ok(config)
        }
        None => Ok(QuarryConfig::default()),
    }
}

/// Load both the catalog and the configuration from `dir`.
pub fn load_quarry_data(dir: &Path) -> Result<QuarryData, DataLoadError> {
    Ok(QuarryData {
        catalog: load_catalog(dir)?,
        config: load_config(dir)?,
    })
}

/// The built-in catalog: six pickaxe tiers, the furnace fuel table and a
/// handful of common drops.
pub fn standard_catalog() -> Result<Catalog, DataLoadError> {
    let file = Path::new("standard_items.ron");
    let items: Vec<ItemData> = parse_str(STANDARD_ITEMS, Format::Ron, file)?;
    build_catalog(&items, file)
}
