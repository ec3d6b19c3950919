//! Reaction selection for a single cluster.
//!
//! A cluster is reduced to a [`Stoichiometry`] (symbol → available count).
//! [`find_match`] picks the applicable reaction that consumes the most units
//! at once, breaking ties by catalog registration order, and reports how many
//! times it can fire. [`plan`] repeats that until nothing applies.

use crate::catalog::{BalancedReaction, Catalog};
use crate::id::ReactionId;
use std::collections::BTreeMap;

/// Available count per symbol within one cluster. Zero counts are never
/// stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stoichiometry {
    counts: BTreeMap<String, u32>,
}

impl Stoichiometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every occurrence of each symbol.
    pub fn from_symbols<'a, I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut stoich = Self::new();
        for symbol in symbols {
            stoich.add(symbol, 1);
        }
        stoich
    }

    pub fn add(&mut self, symbol: &str, count: u32) {
        if count == 0 {
            return;
        }
        *self.counts.entry(symbol.to_string()).or_insert(0) += count;
    }

    pub fn count(&self, symbol: &str) -> u32 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total units across all symbols.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(s, c)| (s.as_str(), *c))
    }

    /// How many times `reaction` can fire against these counts. Zero when
    /// any reactant is missing or short.
    pub fn factor_for(&self, reaction: &BalancedReaction) -> u32 {
        reaction
            .reactants
            .iter()
            .map(|term| self.count(&term.symbol) / term.quantity)
            .min()
            .unwrap_or(0)
    }

    /// Subtract `required × factor` for every reactant. Counts saturate at
    /// zero and zeroed symbols are dropped.
    pub fn apply(&mut self, reaction: &BalancedReaction, factor: u32) {
        for term in &reaction.reactants {
            let used = term.quantity.saturating_mul(factor);
            if let Some(available) = self.counts.get_mut(&term.symbol) {
                *available = available.saturating_sub(used);
                if *available == 0 {
                    self.counts.remove(&term.symbol);
                }
            }
        }
    }
}

/// A chosen reaction and how many times it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionMatch {
    pub reaction: ReactionId,
    /// Always >= 1.
    pub factor: u32,
}

/// Find the best applicable reaction for `stoich`.
///
/// Applicable means every reactant is present with a factor of at least one.
/// The largest total reactant count wins; equal totals go to the reaction
/// registered first.
pub fn find_match(catalog: &Catalog, stoich: &Stoichiometry) -> Option<ReactionMatch> {
    let mut best: Option<(u32, ReactionMatch)> = None;

    for reaction in catalog.reactions() {
        let factor = stoich.factor_for(reaction);
        if factor == 0 {
            continue;
        }
        let total = reaction.total_reactant_units();
        // Strictly greater keeps the earliest registration on ties.
        if best.is_none_or(|(best_total, _)| total > best_total) {
            best = Some((
                total,
                ReactionMatch {
                    reaction: reaction.id,
                    factor,
                },
            ));
        }
    }

    best.map(|(_, m)| m)
}

/// Run [`find_match`] until nothing applies, applying each match to a copy of
/// `stoich`. Returns the matches in the order they fired.
///
/// Terminates because every match removes at least one unit.
pub fn plan(catalog: &Catalog, stoich: &Stoichiometry) -> Vec<ReactionMatch> {
    let mut remaining = stoich.clone();
    let mut steps = Vec::new();

    while let Some(m) = find_match(catalog, &remaining) {
        let Some(reaction) = catalog.reaction(m.reaction) else {
            break;
        };
        remaining.apply(reaction, m.factor);
        steps.push(m);
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn empty_stoich_matches_nothing() {
        let cat = water_catalog();
        assert!(find_match(&cat, &Stoichiometry::new()).is_none());
    }

    #[test]
    fn missing_reactant_is_not_applicable() {
        let cat = water_catalog();
        let stoich = Stoichiometry::from_symbols(["O"]);
        assert!(find_match(&cat, &stoich).is_none());
    }

    #[test]
    fn factor_is_floor_min() {
        let cat = water_catalog();
        let stoich = Stoichiometry::from_symbols(["H", "H", "H", "H", "H"]);
        let m = find_match(&cat, &stoich).unwrap();
        assert_eq!(cat.reaction(m.reaction).unwrap().equation, "2H → H₂");
        assert_eq!(m.factor, 2);
    }

    #[test]
    fn larger_reaction_wins() {
        let cat = water_catalog();
        let stoich = Stoichiometry::from_symbols(["H", "H", "H", "H", "O", "O"]);
        let m = find_match(&cat, &stoich).unwrap();
        assert_eq!(cat.reaction(m.reaction).unwrap().equation, "2H + O → H₂O");
        assert_eq!(m.factor, 2);
    }

    #[test]
    fn tie_goes_to_first_registered() {
        let cat = tie_catalog();
        let stoich = Stoichiometry::from_symbols(["H", "O"]);
        for _ in 0..10 {
            let m = find_match(&cat, &stoich).unwrap();
            assert_eq!(m.reaction, ReactionId(0));
        }
    }

    #[test]
    fn apply_never_underflows() {
        let cat = water_catalog();
        let mut stoich = Stoichiometry::from_symbols(["H", "H", "H"]);
        let reaction = &cat.reactions()[0];
        stoich.apply(reaction, 5);
        assert_eq!(stoich.count("H"), 0);
        assert!(stoich.is_empty());
    }

    #[test]
    fn apply_drops_exhausted_symbols() {
        let cat = water_catalog();
        let mut stoich = Stoichiometry::from_symbols(["H", "H", "O", "O"]);
        let water = cat
            .reactions()
            .iter()
            .find(|r| r.equation == "2H + O → H₂O")
            .unwrap();
        stoich.apply(water, 1);
        assert_eq!(stoich.count("H"), 0);
        assert_eq!(stoich.count("O"), 1);
        assert_eq!(stoich.iter().collect::<Vec<_>>(), vec![("O", 1)]);
    }

    #[test]
    fn plan_exhausts_cluster() {
        let cat = water_catalog();
        // 4H + 3O: water fires twice and leaves a single O behind.
        let stoich = Stoichiometry::from_symbols(["H", "H", "H", "H", "O", "O", "O"]);
        let steps = plan(&cat, &stoich);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].factor, 2);
    }

    #[test]
    fn plan_chains_multiple_reactions() {
        let cat = water_catalog();
        let stoich = Stoichiometry::from_symbols(["H", "H", "O", "O", "O"]);
        let equations: Vec<&str> = plan(&cat, &stoich)
            .iter()
            .map(|m| cat.reaction(m.reaction).unwrap().equation.as_str())
            .collect();
        assert_eq!(equations, vec!["2H + O → H₂O", "2O → O₂"]);
    }

    #[test]
    fn total_counts_units() {
        let stoich = Stoichiometry::from_symbols(["Na", "Cl", "Cl"]);
        assert_eq!(stoich.total(), 3);
        assert_eq!(stoich.count("Cl"), 2);
    }
}
