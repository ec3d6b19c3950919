//! Loading pipeline: reads data files and builds core types from them.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus loaders for catalogs, workspace config,
//! badge rules and lessons.

use crate::schema::CatalogData;
use chemlab_core::badge::BadgeRule;
use chemlab_core::catalog::{Catalog, CatalogBuilder, CatalogError, ReactionTerm};
use chemlab_core::config::{ConfigError, WorkspaceConfig};
use chemlab_core::progress::Lesson;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

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

    /// The catalog data parsed but failed validation.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// The workspace config parsed but failed validation.
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

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
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = &found {
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

/// Deserialize `content` in the given format. `origin` names the source in
/// parse errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<T, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: origin.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    if format != Format::Toml {
        return deserialize_str(&content, format, path);
    }

    let parse_err = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };
    let table: toml::Value = toml::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
    let array = table
        .get(toml_key)
        .ok_or_else(|| parse_err(format!("missing key '{toml_key}' in TOML file")))?
        .clone();
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_err(e.to_string()))
}

// ===========================================================================
// Loaders
// ===========================================================================

fn terms(entries: &[(String, u32)]) -> Vec<ReactionTerm> {
    entries
        .iter()
        .map(|(symbol, quantity)| ReactionTerm {
            symbol: symbol.clone(),
            quantity: *quantity,
        })
        .collect()
}

/// Register every entry of `data`, in file order, and build the catalog.
pub fn catalog_from_data(data: &CatalogData) -> Result<Catalog, DataLoadError> {
    let mut builder = CatalogBuilder::new();
    for element in &data.elements {
        if element.discovered {
            builder.register_discovered_element(&element.symbol, &element.name);
        } else {
            builder.register_element(&element.symbol, &element.name);
        }
    }
    for compound in &data.compounds {
        builder.register_compound(&compound.formula, compound.info());
    }
    for reaction in &data.reactions {
        builder.push_reaction(
            terms(&reaction.reactants),
            terms(&reaction.products),
            reaction.equation(),
        );
    }
    Ok(builder.build()?)
}

/// Load `catalog.{ron,toml,json}` from `dir`.
pub fn load_catalog(dir: &Path) -> Result<Catalog, DataLoadError> {
    let path = require_data_file(dir, "catalog")?;
    let data: CatalogData = deserialize_file(&path)?;
    let catalog = catalog_from_data(&data)?;
    log::info!(
        "loaded catalog from {}: {} elements, {} compounds, {} reactions",
        path.display(),
        catalog.element_count(),
        catalog.compound_count(),
        catalog.reaction_count()
    );
    Ok(catalog)
}

/// Load and validate a workspace config file.
pub fn load_config(path: &Path) -> Result<WorkspaceConfig, DataLoadError> {
    let config: WorkspaceConfig = deserialize_file(path)?;
    config.validate()?;
    Ok(config)
}

/// Load badge rules. TOML files keep them under a `badges` array.
pub fn load_badge_rules(path: &Path) -> Result<Vec<BadgeRule>, DataLoadError> {
    deserialize_list(path, "badges")
}

/// Load lessons. TOML files keep them under a `lessons` array.
pub fn load_lessons(path: &Path) -> Result<Vec<Lesson>, DataLoadError> {
    deserialize_list(path, "lessons")
}

// ===========================================================================
// Tests
// ===========================================================================
