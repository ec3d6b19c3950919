//! The workspace engine: owns the placed items of one session and drives
//! the cluster → match → apply → track pipeline.
//!
//! # Operations
//!
//! Every public mutating operation is atomic. It bumps the revision, changes
//! state, buffers events, and delivers them to subscribers when it finishes.
//! A pass that outgrows the event buffer delivers early in order rather than
//! dropping anything. Listeners receive `&Event` and have no handle on the
//! workspace, so a resolution pass can never be re-entered from inside
//! itself.
//!
//! # Item identity
//!
//! Item ids are allocated from a monotonic counter and never reused. A
//! compound keeps full copies of the items it consumed, so breaking it puts
//! the very same ids back on the canvas.

use crate::badge::{BadgeContext, BadgePolicy, RuleBadgePolicy};
use crate::catalog::{Catalog, Compound, Species};
use crate::cluster::{Cluster, build_clusters};
use crate::config::{ConfigError, WorkspaceConfig};
use crate::event::{
    Event, EventBus, EventFilter, EventKind, Listener, ProducedUnit, SubscriberPriority,
};
use crate::id::*;
use crate::position::{Position, ProximityThreshold};
use crate::resolver::{Stoichiometry, plan};
use crate::rng::SimRng;
use serde::Serialize;
use std::collections::BTreeSet;
use std::f64::consts::TAU;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// An element or compound sitting on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedItem {
    pub id: ItemId,
    pub species: Species,
    /// Element symbol or compound formula; the key used for matching.
    pub symbol: String,
    pub position: Position,
    /// Items consumed to make this compound. Empty for elements and for
    /// secondary products of a reaction.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constituents: Vec<PlacedItem>,
}

impl PlacedItem {
    pub fn is_compound(&self) -> bool {
        matches!(self.species, Species::Compound(_))
    }

    pub fn is_breakable(&self) -> bool {
        self.is_compound() && !self.constituents.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// One reaction firing inside a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedReaction {
    pub reaction: ReactionId,
    pub factor: u32,
    pub consumed: Vec<ItemId>,
    pub produced: Vec<ItemId>,
}

/// What a resolution pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Clusters with at least two members that were matched.
    pub reactive_clusters: usize,
    /// Firings in the order they were applied.
    pub applied: Vec<AppliedReaction>,
    /// Compounds produced for the first time this session.
    pub discovered: Vec<CompoundId>,
    /// Badges unlocked during the pass.
    pub badges: Vec<String>,
}

impl ResolutionReport {
    /// True when no reaction fired.
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn consumed_count(&self) -> usize {
        self.applied.iter().map(|a| a.consumed.len()).sum()
    }

    pub fn produced_count(&self) -> usize {
        self.applied.iter().map(|a| a.produced.len()).sum()
    }
}

/// Result of [`Workspace::add_item`]: the placed item and the pass it
/// triggered. The item may already have been consumed by that pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub item: ItemId,
    pub report: ResolutionReport,
}

/// Serializable view of the whole session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceSnapshot {
    pub revision: u64,
    pub items: Vec<PlacedItem>,
    pub discovered: Vec<String>,
    pub history: Vec<String>,
    pub badges: Vec<String>,
    pub selected_compound: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WorkspaceError {
    #[error("unknown element symbol: {0}")]
    UnknownElement(String),
    #[error("'{0}' is a compound; only elements can be placed")]
    NotAnElement(String),
    #[error("unknown element id: {0:?}")]
    UnknownElementId(ElementId),
    #[error("item not found: {0:?}")]
    ItemNotFound(ItemId),
    #[error("item {0:?} is not a compound")]
    NotACompound(ItemId),
    #[error("compound {0:?} has no recorded constituents")]
    NotBreakable(ItemId),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// A single playground session over a shared catalog.
pub struct Workspace {
    catalog: Arc<Catalog>,
    config: WorkspaceConfig,
    threshold: ProximityThreshold,

    /// Live items in insertion order. Clustering and consumption both
    /// follow this order.
    items: Vec<PlacedItem>,
    next_item_id: u64,

    discovered: BTreeSet<String>,
    history: Vec<CompoundId>,
    badges: Vec<String>,
    new_discovery: Option<CompoundId>,
    selected: Option<CompoundId>,

    badge_policy: Box<dyn BadgePolicy>,
    rng: SimRng,
    revision: u64,
    event_bus: EventBus,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("config", &self.config)
            .field("items", &self.items)
            .field("discovered", &self.discovered)
            .field("history", &self.history)
            .field("badges", &self.badges)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Create an empty workspace using the standard badge rules.
    pub fn new(catalog: Arc<Catalog>, config: WorkspaceConfig) -> Result<Self, WorkspaceError> {
        config.validate()?;
        let threshold = config.threshold()?;
        Ok(Self {
            catalog,
            threshold,
            items: Vec::new(),
            next_item_id: 0,
            discovered: BTreeSet::new(),
            history: Vec::new(),
            badges: Vec::new(),
            new_discovery: None,
            selected: None,
            badge_policy: Box::new(RuleBadgePolicy::standard()),
            rng: SimRng::new(config.rng_seed),
            revision: 0,
            event_bus: EventBus::new(config.event_buffer_capacity),
            config,
        })
    }

    /// Replace the badge policy.
    pub fn with_badge_policy(mut self, policy: Box<dyn BadgePolicy>) -> Self {
        self.badge_policy = policy;
        self
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Place an element and resolve the workspace.
    pub fn add_item(&mut self, symbol: &str, position: Position) -> Result<Placement, WorkspaceError> {
        let id = self.element_id(symbol)?;
        self.add_element(id, position)
    }

    /// Place an element by id and resolve the workspace.
    pub fn add_element(
        &mut self,
        element: ElementId,
        position: Position,
    ) -> Result<Placement, WorkspaceError> {
        let symbol = self.element_symbol(element)?;
        self.revision += 1;
        let item = self.insert_element(element, symbol, position);
        let report = self.resolve_pass();
        self.event_bus.deliver();
        Ok(Placement { item, report })
    }

    /// Place an element without resolving. Used for batch setups; call
    /// [`resolve_all`](Self::resolve_all) afterwards.
    pub fn place_item(&mut self, symbol: &str, position: Position) -> Result<ItemId, WorkspaceError> {
        let element = self.element_id(symbol)?;
        let symbol = self.element_symbol(element)?;
        self.revision += 1;
        let item = self.insert_element(element, symbol, position);
        self.event_bus.deliver();
        Ok(item)
    }

    /// Update an item's position during a drag. Does not resolve.
    pub fn move_item(&mut self, id: ItemId, position: Position) -> Result<(), WorkspaceError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(WorkspaceError::ItemNotFound(id))?;
        item.position = position;
        self.revision += 1;
        Ok(())
    }

    /// Drop a dragged item at its final position and resolve.
    pub fn finish_drag(
        &mut self,
        id: ItemId,
        position: Position,
    ) -> Result<ResolutionReport, WorkspaceError> {
        self.move_item(id, position)?;
        let report = self.resolve_pass();
        self.event_bus.deliver();
        Ok(report)
    }

    /// Take an item off the canvas. History and discoveries are unaffected.
    pub fn remove_item(&mut self, id: ItemId) -> Result<PlacedItem, WorkspaceError> {
        let index = self.index_of(id)?;
        self.revision += 1;
        let removed = self.items.remove(index);
        self.event_bus.emit(Event::ItemRemoved {
            item: id,
            revision: self.revision,
        });
        log::debug!("removed {} ({:?})", removed.symbol, id);
        self.event_bus.deliver();
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Cluster every live item and fire all applicable reactions.
    ///
    /// This is a single pass: products are placed after matching finishes,
    /// so they only take part in clustering on the next call.
    pub fn resolve_all(&mut self) -> ResolutionReport {
        self.revision += 1;
        let report = self.resolve_pass();
        if report.is_empty() {
            self.revision -= 1;
        }
        self.event_bus.deliver();
        report
    }

    fn resolve_pass(&mut self) -> ResolutionReport {
        let mut report = ResolutionReport::default();
        if self.items.len() < 2 {
            return report;
        }

        let catalog = Arc::clone(&self.catalog);
        let positions: Vec<Position> = self.items.iter().map(|i| i.position).collect();
        let clusters = build_clusters(&positions, self.threshold);

        let mut consumed = vec![false; self.items.len()];
        let mut produced = Vec::new();

        for cluster in clusters.iter().filter(|c| c.is_reactive()) {
            report.reactive_clusters += 1;
            let units = self.react_cluster(&catalog, cluster, &positions, &mut consumed, &mut report);
            produced.extend(units);
        }

        // A firing whose products are all unknown still consumes.
        if !consumed.contains(&true) {
            return report;
        }

        let mut index = 0;
        self.items.retain(|_| {
            let keep = !consumed[index];
            index += 1;
            keep
        });

        let produced_compounds: Vec<CompoundId> = produced
            .iter()
            .filter_map(|item: &PlacedItem| match item.species {
                Species::Compound(id) => Some(id),
                Species::Element(_) => None,
            })
            .collect();
        self.items.extend(produced);

        for compound in produced_compounds {
            self.track_production(&catalog, compound, &mut report);
        }

        report
    }

    /// Plan and apply reactions for one cluster. Returns the product items,
    /// already positioned.
    fn react_cluster(
        &mut self,
        catalog: &Catalog,
        cluster: &Cluster,
        positions: &[Position],
        consumed: &mut [bool],
        report: &mut ResolutionReport,
    ) -> Vec<PlacedItem> {
        let stoich =
            Stoichiometry::from_symbols(cluster.members.iter().map(|&i| self.items[i].symbol.as_str()));
        let steps = plan(catalog, &stoich);
        if steps.is_empty() {
            return Vec::new();
        }

        let mut products = Vec::new();
        for step in steps {
            let Some(reaction) = catalog.reaction(step.reaction) else {
                continue;
            };
            let mut applied = AppliedReaction {
                reaction: reaction.id,
                factor: step.factor,
                consumed: Vec::new(),
                produced: Vec::new(),
            };
            let mut units = Vec::new();

            for _ in 0..step.factor {
                // Lowest-index free members first, reactant by reactant.
                let mut taken = Vec::new();
                for term in &reaction.reactants {
                    let picks: Vec<usize> = cluster
                        .members
                        .iter()
                        .copied()
                        .filter(|&i| !consumed[i] && self.items[i].symbol == term.symbol)
                        .take(term.quantity as usize)
                        .collect();
                    debug_assert_eq!(picks.len(), term.quantity as usize);
                    for i in picks {
                        consumed[i] = true;
                        taken.push(self.items[i].clone());
                    }
                }
                applied.consumed.extend(taken.iter().map(|item| item.id));

                let mut constituents = Some(taken);
                for term in &reaction.products {
                    let Some(compound) = catalog.compound_by_formula(&term.symbol) else {
                        log::warn!(
                            "'{}' yields unknown compound '{}'; skipped",
                            reaction.equation,
                            term.symbol
                        );
                        continue;
                    };
                    for _ in 0..term.quantity {
                        let item = PlacedItem {
                            id: self.allocate_id(),
                            species: Species::Compound(compound.id),
                            symbol: compound.formula.clone(),
                            position: Position::default(),
                            constituents: constituents.take().unwrap_or_default(),
                        };
                        applied.produced.push(item.id);
                        units.push(ProducedUnit {
                            item: item.id,
                            compound: compound.id,
                            formula: compound.formula.clone(),
                        });
                        products.push(item);
                    }
                }
            }

            log::debug!(
                "applied '{}' x{} (consumed {}, produced {})",
                reaction.equation,
                step.factor,
                applied.consumed.len(),
                applied.produced.len()
            );
            self.event_bus.emit(Event::ReactionApplied {
                reaction: reaction.id,
                factor: step.factor,
                revision: self.revision,
            });
            self.event_bus.emit(Event::ItemsConsumed {
                reaction: reaction.id,
                items: applied.consumed.clone(),
                revision: self.revision,
            });
            self.event_bus.emit(Event::ItemsProduced {
                reaction: reaction.id,
                units,
                revision: self.revision,
            });
            report.applied.push(applied);
        }

        let center = cluster.centroid(positions).unwrap_or_default();
        spread_around(&mut products, center, self.config.product_spread);
        products
    }

    /// History, discovery, info panel and badges for one produced compound.
    fn track_production(
        &mut self,
        catalog: &Catalog,
        compound_id: CompoundId,
        report: &mut ResolutionReport,
    ) {
        let Some(compound) = catalog.compound(compound_id) else {
            return;
        };

        self.history.push(compound.id);
        self.selected = Some(compound.id);

        if self.discovered.insert(compound.formula.clone()) {
            log::info!("discovered {} ({})", compound.formula, compound.common_name());
            self.new_discovery = Some(compound.id);
            report.discovered.push(compound.id);
            self.event_bus.emit(Event::CompoundDiscovered {
                compound: compound.id,
                formula: compound.formula.clone(),
                revision: self.revision,
            });
        }

        let unlocked = self.evaluate_badges(catalog, compound);
        self.event_bus.emit(Event::BadgesEvaluated {
            compound: compound.id,
            unlocked: unlocked.len(),
            revision: self.revision,
        });
        for badge in unlocked {
            log::info!("badge unlocked: {badge}");
            self.event_bus.emit(Event::BadgeUnlocked {
                badge: badge.clone(),
                revision: self.revision,
            });
            report.badges.push(badge.clone());
            self.badges.push(badge);
        }
    }

    fn evaluate_badges(&self, catalog: &Catalog, produced: &Compound) -> Vec<String> {
        let ctx = BadgeContext {
            catalog,
            produced,
            history: &self.history,
            discovered: &self.discovered,
            unlocked: &self.badges,
        };
        self.badge_policy.evaluate(&ctx)
    }

    // -----------------------------------------------------------------------
    // Breaking
    // -----------------------------------------------------------------------

    /// Split a compound back into the items it was made from. Each one
    /// returns under its original id, jittered around the compound's
    /// position. Discoveries and history are left as they are.
    pub fn break_compound(&mut self, id: ItemId) -> Result<Vec<ItemId>, WorkspaceError> {
        let index = self.index_of(id)?;
        let item = &self.items[index];
        if !item.is_compound() {
            return Err(WorkspaceError::NotACompound(id));
        }
        if item.constituents.is_empty() {
            return Err(WorkspaceError::NotBreakable(id));
        }

        self.revision += 1;
        let compound = self.items.remove(index);
        let jitter = self.config.break_jitter;
        let mut restored = Vec::with_capacity(compound.constituents.len());
        for mut part in compound.constituents {
            part.position = compound
                .position
                .offset(self.rng.jitter(jitter), self.rng.jitter(jitter));
            restored.push(part.id);
            self.items.push(part);
        }

        log::debug!("broke {} into {} items", compound.symbol, restored.len());
        self.event_bus.emit(Event::CompoundBroken {
            item: id,
            restored: restored.clone(),
            revision: self.revision,
        });
        self.event_bus.deliver();
        Ok(restored)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Compounds some reaction could make from `symbol`. Advisory only.
    pub fn possible_products_starting_with(&self, symbol: &str) -> Vec<&Compound> {
        self.catalog.possible_products_starting_with(symbol)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// All live items in insertion order.
    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &PlacedItem> {
        self.items.iter().filter(|i| !i.is_compound())
    }

    pub fn compounds(&self) -> impl Iterator<Item = &PlacedItem> {
        self.items.iter().filter(|i| i.is_compound())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Formulas produced at least once this session.
    pub fn discovered(&self) -> &BTreeSet<String> {
        &self.discovered
    }

    /// Every produced compound, oldest first.
    pub fn history(&self) -> &[CompoundId] {
        &self.history
    }

    /// Unlocked badges in unlock order.
    pub fn badges(&self) -> &[String] {
        &self.badges
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // -----------------------------------------------------------------------
    // Discovery notification and info panel
    // -----------------------------------------------------------------------

    /// The most recent first-time discovery, until a consumer takes it.
    pub fn new_discovery(&self) -> Option<&Compound> {
        self.new_discovery.and_then(|id| self.catalog.compound(id))
    }

    pub fn take_new_discovery(&mut self) -> Option<CompoundId> {
        self.new_discovery.take()
    }

    pub fn select_compound(&mut self, id: CompoundId) -> Option<&Compound> {
        let compound = self.catalog.compound(id)?;
        self.selected = Some(id);
        Some(compound)
    }

    pub fn close_info_panel(&mut self) {
        self.selected = None;
    }

    /// Compound shown in the info panel. Every production selects what it
    /// made.
    pub fn selected_compound(&self) -> Option<&Compound> {
        self.selected.and_then(|id| self.catalog.compound(id))
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        let formula = |id: &CompoundId| self.catalog.compound(*id).map(|c| c.formula.clone());
        WorkspaceSnapshot {
            revision: self.revision,
            items: self.items.clone(),
            discovered: self.discovered.iter().cloned().collect(),
            history: self.history.iter().filter_map(formula).collect(),
            badges: self.badges.clone(),
            selected_compound: self.selected.as_ref().and_then(formula),
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn on_event(&mut self, kind: EventKind, listener: Listener) {
        self.event_bus.subscribe(kind, listener);
    }

    pub fn on_event_filtered(
        &mut self,
        kind: EventKind,
        priority: SubscriberPriority,
        filter: Option<EventFilter>,
        listener: Listener,
    ) {
        self.event_bus
            .subscribe_filtered(kind, priority, filter, listener);
    }

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.event_bus.suppress(kind);
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn element_id(&self, symbol: &str) -> Result<ElementId, WorkspaceError> {
        match self.catalog.species(symbol) {
            Some(Species::Element(id)) => Ok(id),
            Some(Species::Compound(_)) => Err(WorkspaceError::NotAnElement(symbol.to_string())),
            None => Err(WorkspaceError::UnknownElement(symbol.to_string())),
        }
    }

    fn element_symbol(&self, element: ElementId) -> Result<String, WorkspaceError> {
        self.catalog
            .element(element)
            .map(|e| e.symbol.clone())
            .ok_or(WorkspaceError::UnknownElementId(element))
    }

    fn insert_element(&mut self, element: ElementId, symbol: String, position: Position) -> ItemId {
        let id = self.allocate_id();
        self.event_bus.emit(Event::ItemPlaced {
            item: id,
            symbol: symbol.clone(),
            revision: self.revision,
        });
        self.items.push(PlacedItem {
            id,
            species: Species::Element(element),
            symbol,
            position,
            constituents: Vec::new(),
        });
        id
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    fn index_of(&self, id: ItemId) -> Result<usize, WorkspaceError> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or(WorkspaceError::ItemNotFound(id))
    }
}

/// Lay products out on a ring around `center`. A single product sits on the
/// center itself.
fn spread_around(products: &mut [PlacedItem], center: Position, radius: f64) {
    let n = products.len();
    if n == 1 {
        products[0].position = center;
        return;
    }
    for (k, item) in products.iter_mut().enumerate() {
        let angle = TAU * k as f64 / n as f64;
        item.position = center.offset(radius * angle.cos(), radius * angle.sin());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::test_utils::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn two_hydrogens_make_h2() {
        let mut ws = water_workspace();
        ws.add_item("H", pos(0.0, 0.0)).unwrap();
        let placement = ws.add_item("H", pos(30.0, 0.0)).unwrap();

        assert_eq!(placement.report.applied.len(), 1);
        assert_eq!(compound_formulas(&ws), vec!["H₂"]);
        assert_eq!(ws.elements().count(), 0);
        assert!(ws.discovered().contains("H₂"));
        assert_eq!(ws.new_discovery().unwrap().formula, "H₂");
    }

    #[test]
    fn lone_item_does_not_react() {
        let mut ws = water_workspace();
        let placement = ws.add_item("H", pos(0.0, 0.0)).unwrap();
        assert!(placement.report.is_empty());
        assert_eq!(ws.item_count(), 1);
        assert!(ws.history().is_empty());
    }

    #[test]
    fn distant_items_stay_apart() {
        let mut ws = water_workspace();
        ws.add_item("H", pos(0.0, 0.0)).unwrap();
        ws.add_item("H", pos(50.1, 0.0)).unwrap();
        assert_eq!(element_symbols(&ws), vec!["H", "H"]);
        assert!(ws.compounds().next().is_none());
    }

    #[test]
    fn threshold_distance_is_inclusive() {
        let mut ws = water_workspace();
        ws.add_item("H", pos(0.0, 0.0)).unwrap();
        ws.add_item("H", pos(50.0, 0.0)).unwrap();
        assert_eq!(compound_formulas(&ws), vec!["H₂"]);
    }

    #[test]
    fn water_preferred_over_hydrogen_gas() {
        let mut ws = water_workspace();
        place_all(
            &mut ws,
            &[
                ("H", 0.0, 0.0),
                ("H", 10.0, 0.0),
                ("H", 20.0, 0.0),
                ("H", 0.0, 10.0),
                ("O", 10.0, 10.0),
                ("O", 20.0, 10.0),
            ],
        );
        let report = ws.resolve_all();
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].factor, 2);
        assert_eq!(compound_formulas(&ws), vec!["H₂O", "H₂O"]);
        assert_eq!(ws.elements().count(), 0);
    }

    #[test]
    fn placing_compound_symbol_is_rejected() {
        let mut ws = lab_workspace();
        assert_eq!(
            ws.add_item("H₂O", pos(0.0, 0.0)),
            Err(WorkspaceError::NotAnElement("H₂O".to_string()))
        );
        assert_eq!(
            ws.add_item("Xe", pos(0.0, 0.0)),
            Err(WorkspaceError::UnknownElement("Xe".to_string()))
        );
        assert!(matches!(
            ws.add_element(ElementId(42), pos(0.0, 0.0)),
            Err(WorkspaceError::UnknownElementId(ElementId(42)))
        ));
        assert_eq!(ws.item_count(), 0);
    }

    #[test]
    fn element_symbol_wins_over_compound() {
        // "Cl" is both an element and a compound in the lab catalog.
        let mut ws = lab_workspace();
        let placement = ws.add_item("Cl", pos(0.0, 0.0)).unwrap();
        assert!(!ws.item(placement.item).unwrap().is_compound());
    }

    #[test]
    fn consumption_takes_lowest_index_first() {
        let mut ws = water_workspace();
        let ids = place_all(
            &mut ws,
            &[("H", 0.0, 0.0), ("H", 10.0, 0.0), ("H", 20.0, 0.0)],
        );
        let report = ws.resolve_all();
        assert_eq!(report.applied[0].consumed, vec![ids[0], ids[1]]);
        assert_eq!(element_symbols(&ws), vec!["H"]);
        assert_eq!(ws.elements().next().unwrap().id, ids[2]);
    }

    #[test]
    fn each_repetition_records_its_own_constituents() {
        let mut ws = water_workspace();
        let ids = place_all(
            &mut ws,
            &[
                ("H", 0.0, 0.0),
                ("H", 10.0, 0.0),
                ("H", 20.0, 0.0),
                ("H", 30.0, 0.0),
                ("O", 0.0, 10.0),
                ("O", 10.0, 10.0),
            ],
        );
        ws.resolve_all();
        let waters: Vec<&PlacedItem> = ws.compounds().collect();
        let parts = |item: &PlacedItem| item.constituents.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(parts(waters[0]), vec![ids[0], ids[1], ids[4]]);
        assert_eq!(parts(waters[1]), vec![ids[2], ids[3], ids[5]]);
    }

    #[test]
    fn products_join_clustering_next_pass() {
        let mut ws = lab_workspace();
        place_all(
            &mut ws,
            &[
                ("H", 0.0, 0.0),
                ("H", 5.0, 0.0),
                ("H", 10.0, 0.0),
                ("H", 15.0, 0.0),
                ("O", 0.0, 5.0),
                ("O", 5.0, 5.0),
                ("Na", 10.0, 5.0),
            ],
        );
        // 2H + O twice; the sodium is left alone.
        let first = ws.resolve_all();
        assert_eq!(first.produced_count(), 2);
        assert_eq!(element_symbols(&ws), vec!["Na"]);

        // Needs two sodium atoms.
        ws.add_item("Na", pos(12.0, 5.0)).unwrap();
        assert_eq!(compound_formulas(&ws), vec!["H₂", "NaOH", "NaOH"]);
        assert!(ws.elements().next().is_none());
    }

    #[test]
    fn co_products_do_not_overlap() {
        let mut products: Vec<PlacedItem> = (0..3)
            .map(|k| PlacedItem {
                id: ItemId(k),
                species: Species::Compound(CompoundId(0)),
                symbol: "NaOH".to_string(),
                position: Position::default(),
                constituents: Vec::new(),
            })
            .collect();
        let center = pos(100.0, 50.0);
        spread_around(&mut products, center, 10.0);
        for (i, a) in products.iter().enumerate() {
            assert!((a.position.distance(&center) - 10.0).abs() < 1e-9);
            for b in &products[i + 1..] {
                assert!(a.position.distance(&b.position) > 1.0);
            }
        }

        let mut single = vec![products[0].clone()];
        spread_around(&mut single, center, 10.0);
        assert_eq!(single[0].position, center);
    }

    #[test]
    fn break_restores_constituents() {
        let mut ws = water_workspace();
        let ids = place_all(&mut ws, &[("H", 0.0, 0.0), ("H", 10.0, 0.0), ("O", 5.0, 5.0)]);
        ws.resolve_all();
        let water = ws.compounds().next().unwrap().id;
        let at = ws.item(water).unwrap().position;
        let history_before = ws.history().to_vec();

        let restored = ws.break_compound(water).unwrap();
        assert_eq!(restored, ids);
        assert!(ws.item(water).is_none());
        assert_eq!(element_symbols(&ws), vec!["H", "H", "O"]);
        assert_eq!(ws.history(), history_before.as_slice());
        assert!(ws.discovered().contains("H₂O"));

        for item in ws.items() {
            assert!((item.position.x - at.x).abs() <= 20.0 + 1e-9);
            assert!((item.position.y - at.y).abs() <= 20.0 + 1e-9);
        }
    }

    #[test]
    fn break_rejects_elements_and_secondary_products() {
        let mut ws = lab_workspace();
        let placement = ws.add_item("Na", pos(0.0, 0.0)).unwrap();
        assert_eq!(
            ws.break_compound(placement.item),
            Err(WorkspaceError::NotACompound(placement.item))
        );
        assert_eq!(
            ws.break_compound(ItemId(999)),
            Err(WorkspaceError::ItemNotFound(ItemId(999)))
        );

        // 2H₂ + O₂ → 2H₂O: the second water carries no constituents.
        ws.remove_item(placement.item).unwrap();
        place_all(&mut ws, &[("H", 0.0, 0.0), ("H", 5.0, 0.0)]);
        ws.resolve_all();
        place_all(&mut ws, &[("H", 0.0, 5.0), ("H", 5.0, 5.0)]);
        ws.resolve_all();
        place_all(&mut ws, &[("O", 10.0, 0.0), ("O", 10.0, 5.0)]);
        ws.resolve_all();
        assert_eq!(compound_formulas(&ws), vec!["H₂", "H₂", "O₂"]);
        let report = ws.resolve_all();
        let produced = &report.applied[0].produced;
        assert_eq!(compound_formulas(&ws), vec!["H₂O", "H₂O"]);
        assert!(ws.item(produced[0]).unwrap().is_breakable());
        assert_eq!(
            ws.break_compound(produced[1]),
            Err(WorkspaceError::NotBreakable(produced[1]))
        );
    }

    #[test]
    fn nested_break_restores_original_ids() {
        let mut ws = water_workspace();
        let ids = place_all(&mut ws, &[("H", 0.0, 0.0), ("H", 5.0, 0.0)]);
        ws.resolve_all();
        let h2 = ws.compounds().next().unwrap().id;
        assert_eq!(ws.break_compound(h2).unwrap(), ids);
        // Ids are never reused.
        let next = ws.place_item("O", pos(100.0, 100.0)).unwrap();
        assert!(next > h2);
    }

    #[test]
    fn discovery_fires_once_history_every_time() {
        let mut ws = water_workspace();
        ws.add_item("H", pos(0.0, 0.0)).unwrap();
        ws.add_item("H", pos(5.0, 0.0)).unwrap();
        assert_eq!(ws.take_new_discovery(), ws.catalog().compound_by_formula("H₂").map(|c| c.id));
        assert!(ws.take_new_discovery().is_none());

        ws.add_item("H", pos(500.0, 0.0)).unwrap();
        let placement = ws.add_item("H", pos(505.0, 0.0)).unwrap();
        assert!(placement.report.discovered.is_empty());
        assert!(ws.new_discovery().is_none());
        assert_eq!(ws.history().len(), 2);
        assert_eq!(ws.discovered().len(), 1);
    }

    #[test]
    fn production_selects_info_panel() {
        let mut ws = lab_workspace();
        ws.add_item("Na", pos(0.0, 0.0)).unwrap();
        ws.add_item("Cl", pos(5.0, 0.0)).unwrap();
        assert_eq!(ws.selected_compound().unwrap().common_name(), "Salt");

        ws.close_info_panel();
        assert!(ws.selected_compound().is_none());

        let water = ws.catalog().compound_by_formula("H₂O").unwrap().id;
        assert_eq!(ws.select_compound(water).unwrap().formula, "H₂O");
        assert!(ws.select_compound(CompoundId(99)).is_none());
        assert_eq!(ws.selected_compound().unwrap().formula, "H₂O");
    }

    #[test]
    fn badges_unlock_once() {
        let mut ws = lab_workspace();
        for k in 0..4 {
            let x = k as f64 * 200.0;
            ws.add_item("H", pos(x, 0.0)).unwrap();
            ws.add_item("H", pos(x + 5.0, 0.0)).unwrap();
        }
        assert_eq!(ws.badges(), ["Hydrogen Hero".to_string()]);
    }

    #[test]
    fn custom_badge_policy_is_used() {
        struct EveryTime;
        impl BadgePolicy for EveryTime {
            fn evaluate(&self, ctx: &BadgeContext<'_>) -> Vec<String> {
                vec![format!("made {}", ctx.produced.formula)]
            }
        }
        let mut ws = lab_workspace().with_badge_policy(Box::new(EveryTime));
        ws.add_item("Na", pos(0.0, 0.0)).unwrap();
        let placement = ws.add_item("Cl", pos(5.0, 0.0)).unwrap();
        assert_eq!(placement.report.badges, vec!["made NaCl"]);
    }

    #[test]
    fn remove_and_move() {
        let mut ws = water_workspace();
        let a = ws.add_item("H", pos(0.0, 0.0)).unwrap().item;
        let b = ws.add_item("H", pos(200.0, 0.0)).unwrap().item;

        ws.move_item(b, pos(20.0, 0.0)).unwrap();
        assert_eq!(ws.item_count(), 2);

        let report = ws.finish_drag(b, pos(10.0, 0.0)).unwrap();
        assert_eq!(report.applied.len(), 1);
        assert!(ws.item(a).is_none());

        let h2 = ws.compounds().next().unwrap().id;
        let removed = ws.remove_item(h2).unwrap();
        assert_eq!(removed.symbol, "H₂");
        assert_eq!(ws.item_count(), 0);
        assert_eq!(ws.history().len(), 1);
        assert_eq!(ws.remove_item(h2), Err(WorkspaceError::ItemNotFound(h2)));
    }

    #[test]
    fn revision_tracks_mutations() {
        let mut ws = water_workspace();
        assert_eq!(ws.revision(), 0);
        ws.add_item("H", pos(0.0, 0.0)).unwrap();
        assert_eq!(ws.revision(), 1);
        ws.resolve_all();
        assert_eq!(ws.revision(), 1);
        ws.place_item("H", pos(5.0, 0.0)).unwrap();
        ws.resolve_all();
        assert_eq!(ws.revision(), 3);
    }

    #[test]
    fn events_delivered_after_operation() {
        let mut ws = water_workspace();
        let log: Rc<RefCell<Vec<EventKind>>> = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            EventKind::ItemPlaced,
            EventKind::ReactionApplied,
            EventKind::ItemsConsumed,
            EventKind::ItemsProduced,
            EventKind::CompoundDiscovered,
        ] {
            let log = Rc::clone(&log);
            ws.on_event(kind, Box::new(move |e: &Event| log.borrow_mut().push(e.kind())));
        }

        ws.add_item("H", pos(0.0, 0.0)).unwrap();
        ws.add_item("H", pos(5.0, 0.0)).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                EventKind::ItemPlaced,
                EventKind::ItemPlaced,
                EventKind::ReactionApplied,
                EventKind::ItemsConsumed,
                EventKind::ItemsProduced,
                EventKind::CompoundDiscovered,
            ]
        );
        assert!(ws.event_bus().buffer().is_empty());
    }

    #[test]
    fn long_pass_delivers_every_event() {
        let config = WorkspaceConfig {
            event_buffer_capacity: 16,
            ..Default::default()
        };
        let mut ws = Workspace::new(Arc::new(water_catalog()), config).unwrap();
        for k in 0..400 {
            let x = k as f64 * 200.0;
            ws.place_item("H", pos(x, 0.0)).unwrap();
            ws.place_item("H", pos(x + 10.0, 0.0)).unwrap();
        }

        let consumed = Rc::new(RefCell::new(0usize));
        let produced = Rc::new(RefCell::new(0usize));
        let c = Rc::clone(&consumed);
        ws.on_event(
            EventKind::ItemsConsumed,
            Box::new(move |e: &Event| {
                if let Event::ItemsConsumed { items, .. } = e {
                    *c.borrow_mut() += items.len();
                }
            }),
        );
        let p = Rc::clone(&produced);
        ws.on_event(EventKind::ItemsProduced, Box::new(move |_: &Event| *p.borrow_mut() += 1));

        let report = ws.resolve_all();
        assert_eq!(report.applied.len(), 400);
        assert_eq!(*consumed.borrow(), 800);
        assert_eq!(*produced.borrow(), 400);
        assert_eq!(ws.event_bus().buffer().dropped_count(), 0);
        assert!(ws.event_bus().buffer().is_empty());
    }

    #[test]
    fn every_production_raises_a_badge_check() {
        let mut ws = lab_workspace();
        let checks = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&checks);
        ws.on_event(
            EventKind::BadgesEvaluated,
            Box::new(move |e: &Event| {
                if let Event::BadgesEvaluated { unlocked, .. } = e {
                    c.borrow_mut().push(*unlocked);
                }
            }),
        );

        for k in 0..3 {
            let x = k as f64 * 200.0;
            ws.add_item("H", pos(x, 0.0)).unwrap();
            ws.add_item("H", pos(x + 5.0, 0.0)).unwrap();
        }
        assert_eq!(*checks.borrow(), vec![0, 1, 0]);
        assert_eq!(ws.badges(), ["Hydrogen Hero".to_string()]);
    }

    #[test]
    fn suppressed_events_not_delivered() {
        let mut ws = water_workspace();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        ws.on_event(EventKind::ItemPlaced, Box::new(move |_: &Event| *c.borrow_mut() += 1));
        ws.suppress_event(EventKind::ItemPlaced);
        ws.add_item("H", pos(0.0, 0.0)).unwrap();
        assert_eq!(*count.borrow(), 0);
        assert_eq!(ws.event_bus().total_emitted(EventKind::ItemPlaced), 0);
    }

    #[test]
    fn snapshot_lists_formulas() {
        let mut ws = lab_workspace();
        ws.add_item("Na", pos(0.0, 0.0)).unwrap();
        ws.add_item("Cl", pos(5.0, 0.0)).unwrap();
        let snap = ws.snapshot();
        assert_eq!(snap.history, vec!["NaCl"]);
        assert_eq!(snap.discovered, vec!["NaCl"]);
        assert_eq!(snap.selected_compound.as_deref(), Some("NaCl"));
        assert_eq!(snap.items.len(), 1);
        assert_eq!(snap.items[0].constituents.len(), 2);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["items"][0]["symbol"], "NaCl");
    }

    #[test]
    fn invalid_config_rejected() {
        let config = WorkspaceConfig {
            cluster_threshold: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            Workspace::new(Arc::new(water_catalog()), config),
            Err(WorkspaceError::Config(ConfigError::InvalidThreshold(_)))
        ));
    }

    #[test]
    fn possible_products_are_advisory() {
        let ws = lab_workspace();
        let formulas: Vec<&str> = ws
            .possible_products_starting_with("Na")
            .iter()
            .map(|c| c.formula.as_str())
            .collect();
        assert_eq!(formulas, vec!["NaCl", "NaOH", "H₂"]);
        assert_eq!(ws.item_count(), 0);
    }

    #[test]
    fn unknown_product_is_skipped_but_reactants_are_consumed() {
        let mut b = CatalogBuilder::new();
        b.register_element("X", "Mystery");
        b.register_reaction(&[("X", 2)], &[("X₂", 1)], "2X → X₂");
        let catalog = Arc::new(b.build().unwrap());
        let mut ws = Workspace::new(catalog, WorkspaceConfig::default()).unwrap();

        ws.add_item("X", pos(0.0, 0.0)).unwrap();
        let placement = ws.add_item("X", pos(10.0, 0.0)).unwrap();

        assert_eq!(placement.report.consumed_count(), 2);
        assert_eq!(placement.report.produced_count(), 0);
        assert_eq!(ws.item_count(), 0);
        assert!(ws.history().is_empty());
        assert!(ws.discovered().is_empty());
    }
}
