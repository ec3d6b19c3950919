//! Chemlab Core -- the reaction engine behind the chemistry playground.
//!
//! Users drop element tokens on a canvas. The engine groups nearby tokens
//! into clusters, matches each cluster against a catalog of balanced
//! reactions and replaces the reactants with product compounds.
//!
//! # Resolution Pass
//!
//! Each call to [`workspace::Workspace::resolve_all`] runs:
//!
//! 1. **Cluster** -- partition every live item by proximity.
//! 2. **Plan** -- for each cluster with two or more members, repeatedly pick
//!    the best applicable reaction and its repeat factor.
//! 3. **Apply** -- consume the chosen members, place the products.
//! 4. **Track** -- update discoveries, history and badges.
//! 5. **Deliver** -- hand buffered events to subscribers.
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- Immutable table of elements, compounds and
//!   balanced reactions (frozen at startup, shared via `Arc`).
//! - [`cluster::build_clusters`] -- Proximity clustering by BFS.
//! - [`resolver::find_match`] -- Reaction selection with deterministic
//!   tie-breaks.
//! - [`workspace::Workspace`] -- The mutable session state machine.
//! - [`event::EventBus`] -- Subscription-based event bus with buffered delivery.
//! - [`badge::BadgePolicy`] -- Pluggable achievement rules.
//! - [`progress::ProgressTracker`] -- Lesson progress for the dashboard.

pub mod badge;
pub mod catalog;
pub mod cluster;
pub mod config;
pub mod event;
pub mod id;
pub mod position;
pub mod progress;
pub mod resolver;
pub mod rng;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
