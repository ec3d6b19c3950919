//! Loads content from disk and drives a workspace with it.

use chemlab_core::badge::RuleBadgePolicy;
use chemlab_core::config::WorkspaceConfig;
use chemlab_core::test_utils::pos;
use chemlab_core::workspace::Workspace;
use chemlab_data::{load_badge_rules, load_catalog, standard_catalog};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "chemlab_data_it_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

const CATALOG_TOML: &str = r#"
[[elements]]
symbol = "Na"
name = "Sodium"

[[elements]]
symbol = "Cl"
name = "Chlorine"

[[compounds]]
formula = "NaCl"
iupac_name = "Sodium chloride"
common_name = "Salt"

[[reactions]]
reactants = [["Na", 1], ["Cl", 1]]
products = [["NaCl", 1]]
"#;

#[test]
fn toml_catalog_drives_a_workspace() {
    let dir = make_test_dir("toml");
    fs::write(dir.join("catalog.toml"), CATALOG_TOML).unwrap();
    fs::write(
        dir.join("badges.toml"),
        r#"
            [[badges]]
            name = "First Salt"
            criterion = { HistoryFormula = { formula = "NaCl", count = 1 } }
        "#,
    )
    .unwrap();

    let catalog = Arc::new(load_catalog(&dir).unwrap());
    let rules = load_badge_rules(&dir.join("badges.toml")).unwrap();
    let mut ws = Workspace::new(catalog, WorkspaceConfig::default())
        .unwrap()
        .with_badge_policy(Box::new(RuleBadgePolicy::new(rules)));

    ws.add_item("Na", pos(0.0, 0.0)).unwrap();
    let placement = ws.add_item("Cl", pos(30.0, 0.0)).unwrap();

    assert_eq!(placement.report.applied.len(), 1);
    assert_eq!(placement.report.badges, vec!["First Salt".to_string()]);
    assert!(ws.discovered().contains("NaCl"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn standard_catalog_makes_water() {
    let mut ws = Workspace::new(Arc::new(standard_catalog().unwrap()), WorkspaceConfig::default())
        .unwrap();
    ws.place_item("H", pos(0.0, 0.0)).unwrap();
    ws.place_item("H", pos(40.0, 0.0)).unwrap();
    let placement = ws.add_item("O", pos(20.0, 0.0)).unwrap();

    let water = ws.catalog().compound_by_formula("H₂O").unwrap().id;
    assert_eq!(placement.report.discovered, vec![water]);
    assert_eq!(ws.items().len(), 1);
    assert_eq!(ws.items()[0].symbol, "H₂O");
}
