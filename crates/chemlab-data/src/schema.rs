//! Serde data file structs for catalog content.
//!
//! These structs define the on-disk format for elements, compounds and
//! reactions. They are deserialized from RON, JSON, or TOML data files and
//! then turned into a [`Catalog`](chemlab_core::catalog::Catalog) by the
//! loader.

use chemlab_core::catalog::CompoundInfo;
use serde::Deserialize;

// ===========================================================================
// Elements
// ===========================================================================

/// An element definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementData {
    pub symbol: String,
    pub name: String,
    /// Marks elements unlocked by play rather than shipped with the app.
    #[serde(default)]
    pub discovered: bool,
}

// ===========================================================================
// Compounds
// ===========================================================================

/// A compound definition with its info-panel text.
#[derive(Debug, Clone, Deserialize)]
pub struct CompoundData {
    pub formula: String,
    pub iupac_name: String,
    pub common_name: String,
    #[serde(default)]
    pub equation: Option<String>,
    #[serde(default)]
    pub uses: Option<String>,
    #[serde(default)]
    pub fun_fact: Option<String>,
}

impl CompoundData {
    pub fn info(&self) -> CompoundInfo {
        CompoundInfo {
            iupac_name: self.iupac_name.clone(),
            common_name: self.common_name.clone(),
            equation: self.equation.clone(),
            uses: self.uses.clone(),
            fun_fact: self.fun_fact.clone(),
        }
    }
}

// ===========================================================================
// Reactions
// ===========================================================================

/// A balanced reaction. Terms use the short tuple form
/// `("symbol", quantity)`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionData {
    pub reactants: Vec<(String, u32)>,
    pub products: Vec<(String, u32)>,
    /// Display form. Generated from the terms when omitted.
    #[serde(default)]
    pub equation: Option<String>,
}

impl ReactionData {
    pub fn equation(&self) -> String {
        match &self.equation {
            Some(equation) => equation.clone(),
            None => format!("{} → {}", side(&self.reactants), side(&self.products)),
        }
    }
}

fn side(terms: &[(String, u32)]) -> String {
    terms
        .iter()
        .map(|(symbol, quantity)| match quantity {
            1 => symbol.clone(),
            n => format!("{n}{symbol}"),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

// ===========================================================================
// Whole catalog
// ===========================================================================

/// The contents of a `catalog.{ron,toml,json}` file. Order is significant:
/// earlier reactions win ties.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogData {
    pub elements: Vec<ElementData>,
    #[serde(default)]
    pub compounds: Vec<CompoundData>,
    #[serde(default)]
    pub reactions: Vec<ReactionData>,
}
