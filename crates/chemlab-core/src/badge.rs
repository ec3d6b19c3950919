//! Achievement badges.
//!
//! After every produced compound the workspace asks its [`BadgePolicy`] which
//! badges became newly unlocked. The default [`RuleBadgePolicy`] evaluates a
//! list of data-driven [`BadgeRule`]s over the reaction history and the
//! discovered set.

use crate::catalog::{Catalog, Compound};
use crate::id::CompoundId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything a policy may look at. History already includes `produced`.
#[derive(Debug, Clone, Copy)]
pub struct BadgeContext<'a> {
    pub catalog: &'a Catalog,
    pub produced: &'a Compound,
    pub history: &'a [CompoundId],
    pub discovered: &'a BTreeSet<String>,
    pub unlocked: &'a [String],
}

/// Decides which badges a production unlocks.
pub trait BadgePolicy {
    /// Names of badges that are earned now and not in `ctx.unlocked`.
    fn evaluate(&self, ctx: &BadgeContext<'_>) -> Vec<String>;
}

/// Condition for a single badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeCriterion {
    /// At least `count` history entries whose common name contains
    /// `needle`, ignoring case.
    HistoryNameContains { needle: String, count: usize },
    /// At least `count` history entries with exactly this formula.
    HistoryFormula { formula: String, count: usize },
    /// At least `count` distinct formulas discovered.
    DistinctDiscoveries { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeRule {
    pub name: String,
    pub criterion: BadgeCriterion,
}

impl BadgeRule {
    pub fn new(name: &str, criterion: BadgeCriterion) -> Self {
        Self {
            name: name.to_string(),
            criterion,
        }
    }

    pub fn is_met(&self, ctx: &BadgeContext<'_>) -> bool {
        let history = ctx
            .history
            .iter()
            .filter_map(|id| ctx.catalog.compound(*id));
        match &self.criterion {
            BadgeCriterion::HistoryNameContains { needle, count } => {
                let needle = needle.to_lowercase();
                history
                    .filter(|c| c.common_name().to_lowercase().contains(&needle))
                    .count()
                    >= *count
            }
            BadgeCriterion::HistoryFormula { formula, count } => {
                history.filter(|c| &c.formula == formula).count() >= *count
            }
            BadgeCriterion::DistinctDiscoveries { count } => ctx.discovered.len() >= *count,
        }
    }
}

/// Evaluates rules in order; each badge unlocks at most once.
#[derive(Debug, Clone, Default)]
pub struct RuleBadgePolicy {
    rules: Vec<BadgeRule>,
}

impl RuleBadgePolicy {
    pub fn new(rules: Vec<BadgeRule>) -> Self {
        Self { rules }
    }

    /// The five standard lab badges.
    pub fn standard() -> Self {
        Self::new(vec![
            BadgeRule::new(
                "Salt Master",
                BadgeCriterion::HistoryNameContains {
                    needle: "salt".to_string(),
                    count: 3,
                },
            ),
            BadgeRule::new(
                "Water Wizard",
                BadgeCriterion::HistoryFormula {
                    formula: "H₂O".to_string(),
                    count: 3,
                },
            ),
            BadgeRule::new(
                "Oxidation Expert",
                BadgeCriterion::HistoryFormula {
                    formula: "O₂".to_string(),
                    count: 2,
                },
            ),
            BadgeRule::new(
                "Hydrogen Hero",
                BadgeCriterion::HistoryFormula {
                    formula: "H₂".to_string(),
                    count: 2,
                },
            ),
            BadgeRule::new(
                "Compound Collector",
                BadgeCriterion::DistinctDiscoveries { count: 5 },
            ),
        ])
    }

    pub fn rules(&self) -> &[BadgeRule] {
        &self.rules
    }
}

impl BadgePolicy for RuleBadgePolicy {
    fn evaluate(&self, ctx: &BadgeContext<'_>) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| !ctx.unlocked.iter().any(|b| b == &rule.name))
            .filter(|rule| rule.is_met(ctx))
            .map(|rule| rule.name.clone())
            .collect()
    }
}
