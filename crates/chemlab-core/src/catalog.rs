//! The reaction catalog: elements, compounds and balanced reactions.
//!
//! Built once at startup through [`CatalogBuilder`] and frozen into an
//! immutable [`Catalog`] that sessions share behind an `Arc`. Invalid
//! reactions are rejected by [`CatalogBuilder::build`] so gameplay never has
//! to deal with them.

use crate::id::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Whether an element ships with the app or was added later as a discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElementOrigin {
    #[default]
    BuiltIn,
    Discovered,
}

/// An atomic reactive unit, e.g. `H` or `Na`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub id: ElementId,
    pub symbol: String,
    pub name: String,
    pub origin: ElementOrigin,
}

/// Educational metadata shown in the compound info panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompoundInfo {
    pub iupac_name: String,
    pub common_name: String,
    #[serde(default)]
    pub equation: Option<String>,
    #[serde(default)]
    pub uses: Option<String>,
    #[serde(default)]
    pub fun_fact: Option<String>,
}

/// A named reaction product. One definition per logical compound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compound {
    pub id: CompoundId,
    pub formula: String,
    pub info: CompoundInfo,
}

impl Compound {
    pub fn common_name(&self) -> &str {
        &self.info.common_name
    }
}

/// One side entry of a reaction: `quantity` units of `symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTerm {
    pub symbol: String,
    pub quantity: u32,
}

/// A balanced reaction, e.g. `2H + O → H₂O`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancedReaction {
    pub id: ReactionId,
    pub reactants: Vec<ReactionTerm>,
    pub products: Vec<ReactionTerm>,
    pub equation: String,
}

impl BalancedReaction {
    /// Sum of required reactant quantities. Used as the primary tie-break.
    pub fn total_reactant_units(&self) -> u32 {
        self.reactants.iter().map(|t| t.quantity).sum()
    }

    pub fn requires(&self, symbol: &str) -> bool {
        self.reactants.iter().any(|t| t.symbol == symbol)
    }
}

/// What a symbol refers to in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Element(ElementId),
    Compound(CompoundId),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Catalog`].
/// Registration first, then a validating `build()`.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    elements: Vec<Element>,
    compounds: Vec<Compound>,
    reactions: Vec<BalancedReaction>,
}

fn terms(entries: &[(&str, u32)]) -> Vec<ReactionTerm> {
    entries
        .iter()
        .map(|(symbol, quantity)| ReactionTerm {
            symbol: (*symbol).to_string(),
            quantity: *quantity,
        })
        .collect()
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built-in element. Returns its ID.
    pub fn register_element(&mut self, symbol: &str, name: &str) -> ElementId {
        self.push_element(symbol, name, ElementOrigin::BuiltIn)
    }

    /// Register an element flagged as discovered rather than built in.
    pub fn register_discovered_element(&mut self, symbol: &str, name: &str) -> ElementId {
        self.push_element(symbol, name, ElementOrigin::Discovered)
    }

    fn push_element(&mut self, symbol: &str, name: &str, origin: ElementOrigin) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(Element {
            id,
            symbol: symbol.to_string(),
            name: name.to_string(),
            origin,
        });
        id
    }

    /// Register a compound definition. Returns its ID.
    pub fn register_compound(&mut self, formula: &str, info: CompoundInfo) -> CompoundId {
        let id = CompoundId(self.compounds.len() as u32);
        self.compounds.push(Compound {
            id,
            formula: formula.to_string(),
            info,
        });
        id
    }

    /// Register a balanced reaction. Registration order is the secondary
    /// tie-break when two reactions consume the same number of units.
    pub fn register_reaction(
        &mut self,
        reactants: &[(&str, u32)],
        products: &[(&str, u32)],
        equation: &str,
    ) -> ReactionId {
        self.push_reaction(terms(reactants), terms(products), equation.to_string())
    }

    /// Like [`register_reaction`](Self::register_reaction) with owned terms.
    pub fn push_reaction(
        &mut self,
        reactants: Vec<ReactionTerm>,
        products: Vec<ReactionTerm>,
        equation: String,
    ) -> ReactionId {
        let id = ReactionId(self.reactions.len() as u32);
        self.reactions.push(BalancedReaction {
            id,
            reactants,
            products,
            equation,
        });
        id
    }

    /// Validate and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut element_by_symbol = HashMap::new();
        for element in &self.elements {
            if element_by_symbol
                .insert(element.symbol.clone(), element.id)
                .is_some()
            {
                return Err(CatalogError::DuplicateElement(element.symbol.clone()));
            }
        }

        let mut compound_by_formula = HashMap::new();
        for compound in &self.compounds {
            if compound_by_formula
                .insert(compound.formula.clone(), compound.id)
                .is_some()
            {
                return Err(CatalogError::DuplicateCompound(compound.formula.clone()));
            }
        }

        for reaction in &self.reactions {
            if reaction.reactants.is_empty() {
                return Err(CatalogError::EmptyReactants(reaction.equation.clone()));
            }
            check_side(&reaction.equation, &reaction.reactants)?;
            check_side(&reaction.equation, &reaction.products)?;

            for term in &reaction.reactants {
                if !element_by_symbol.contains_key(&term.symbol)
                    && !compound_by_formula.contains_key(&term.symbol)
                {
                    return Err(CatalogError::UnknownReactant {
                        equation: reaction.equation.clone(),
                        symbol: term.symbol.clone(),
                    });
                }
            }
            for term in &reaction.products {
                if !compound_by_formula.contains_key(&term.symbol) {
                    log::warn!(
                        "reaction '{}' yields unregistered compound '{}'; it will be skipped",
                        reaction.equation,
                        term.symbol
                    );
                }
            }
        }

        log::debug!(
            "catalog built: {} elements, {} compounds, {} reactions",
            self.elements.len(),
            self.compounds.len(),
            self.reactions.len()
        );

        Ok(Catalog {
            elements: self.elements,
            element_by_symbol,
            compounds: self.compounds,
            compound_by_formula,
            reactions: self.reactions,
        })
    }
}

fn check_side(equation: &str, side: &[ReactionTerm]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for term in side {
        if term.quantity == 0 {
            return Err(CatalogError::ZeroQuantity {
                equation: equation.to_string(),
                symbol: term.symbol.clone(),
            });
        }
        if !seen.insert(term.symbol.as_str()) {
            return Err(CatalogError::DuplicateTerm {
                equation: equation.to_string(),
                symbol: term.symbol.clone(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after build(). Thread-safe to share.
#[derive(Debug)]
pub struct Catalog {
    elements: Vec<Element>,
    element_by_symbol: HashMap<String, ElementId>,
    compounds: Vec<Compound>,
    compound_by_formula: HashMap<String, CompoundId>,
    reactions: Vec<BalancedReaction>,
}

impl Catalog {
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0 as usize)
    }

    pub fn compound(&self, id: CompoundId) -> Option<&Compound> {
        self.compounds.get(id.0 as usize)
    }

    pub fn reaction(&self, id: ReactionId) -> Option<&BalancedReaction> {
        self.reactions.get(id.0 as usize)
    }

    pub fn element_by_symbol(&self, symbol: &str) -> Option<&Element> {
        self.element_by_symbol
            .get(symbol)
            .and_then(|id| self.element(*id))
    }

    /// The registered compound for an exact formula, or `None` if unknown.
    pub fn compound_by_formula(&self, formula: &str) -> Option<&Compound> {
        self.compound_by_formula
            .get(formula)
            .and_then(|id| self.compound(*id))
    }

    /// Resolve a symbol. Elements win over compounds sharing the same symbol
    /// (a lone `Cl` atom may be registered as both).
    pub fn species(&self, symbol: &str) -> Option<Species> {
        if let Some(id) = self.element_by_symbol.get(symbol) {
            return Some(Species::Element(*id));
        }
        self.compound_by_formula
            .get(symbol)
            .map(|id| Species::Compound(*id))
    }

    /// All reactions in registration order.
    pub fn reactions(&self) -> &[BalancedReaction] {
        &self.reactions
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    /// Every known product of every reaction that takes `symbol` as a
    /// reactant. Deduplicated, in catalog order. Advisory only.
    pub fn possible_products_starting_with(&self, symbol: &str) -> Vec<&Compound> {
        let mut seen = HashSet::new();
        self.reactions
            .iter()
            .filter(|r| r.requires(symbol))
            .flat_map(|r| r.products.iter())
            .filter_map(|t| self.compound_by_formula(&t.symbol))
            .filter(|c| seen.insert(c.id))
            .collect()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn compound_count(&self) -> usize {
        self.compounds.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate element symbol: {0}")]
    DuplicateElement(String),
    #[error("duplicate compound formula: {0}")]
    DuplicateCompound(String),
    #[error("reaction '{0}' has no reactants")]
    EmptyReactants(String),
    #[error("reaction '{equation}' lists '{symbol}' with quantity 0")]
    ZeroQuantity { equation: String, symbol: String },
    #[error("reaction '{equation}' lists '{symbol}' twice on one side")]
    DuplicateTerm { equation: String, symbol: String },
    #[error("reaction '{equation}' needs unknown reactant '{symbol}'")]
    UnknownReactant { equation: String, symbol: String },
}
