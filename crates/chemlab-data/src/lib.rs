//! Data loading for Chemlab: catalogs, workspace config, badge rules and
//! lessons from RON, TOML or JSON files, plus the bundled standard content.

pub mod loader;
pub mod schema;
pub mod standard;

pub use loader::{DataLoadError, load_badge_rules, load_catalog, load_config, load_lessons};
pub use standard::{standard_badge_rules, standard_catalog, standard_lessons};
