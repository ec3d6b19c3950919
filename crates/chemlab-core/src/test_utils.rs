//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::catalog::{Catalog, CatalogBuilder, CompoundInfo};
use crate::config::WorkspaceConfig;
use crate::id::{ItemId, LessonId};
use crate::position::Position;
use crate::progress::{Lesson, Quiz};
use crate::workspace::Workspace;
use std::sync::Arc;

// ===========================================================================
// Small constructors
// ===========================================================================

pub fn pos(x: f64, y: f64) -> Position {
    Position::new(x, y)
}

pub fn info(iupac: &str, common: &str) -> CompoundInfo {
    CompoundInfo {
        iupac_name: iupac.to_string(),
        common_name: common.to_string(),
        ..Default::default()
    }
}

// ===========================================================================
// Catalogs
// ===========================================================================

/// H and O with the three hydrogen/oxygen reactions, in this order:
/// `2H → H₂`, `2O → O₂`, `2H + O → H₂O`.
pub fn water_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_element("H", "Hydrogen");
    b.register_element("O", "Oxygen");
    b.register_compound("H₂", info("Dihydrogen", "Hydrogen Gas"));
    b.register_compound("O₂", info("Dioxygen", "Oxygen Gas"));
    b.register_compound("H₂O", info("Dihydrogen monoxide", "Water"));
    b.register_reaction(&[("H", 2)], &[("H₂", 1)], "2H → H₂");
    b.register_reaction(&[("O", 2)], &[("O₂", 1)], "2O → O₂");
    b.register_reaction(&[("H", 2), ("O", 1)], &[("H₂O", 1)], "2H + O → H₂O");
    b.build().expect("water catalog is valid")
}

/// Two reactions over the same reactants with equal totals.
pub fn tie_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_element("H", "Hydrogen");
    b.register_element("O", "Oxygen");
    b.register_compound("OH", info("Hydroxyl", "Hydroxyl Radical"));
    b.register_compound("OH⁻", info("Hydroxide", "Hydroxide Ion"));
    b.register_reaction(&[("H", 1), ("O", 1)], &[("OH", 1)], "H + O → OH");
    b.register_reaction(&[("O", 1), ("H", 1)], &[("OH⁻", 1)], "O + H → OH⁻");
    b.build().expect("tie catalog is valid")
}

/// The full playground catalog: four elements, eight compounds and twelve
/// reactions.
pub fn lab_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_element("H", "Hydrogen");
    b.register_element("O", "Oxygen");
    b.register_element("Na", "Sodium");
    b.register_element("Cl", "Chlorine");

    b.register_compound("H₂", info("Dihydrogen", "Hydrogen Gas"));
    b.register_compound("O₂", info("Dioxygen", "Oxygen Gas"));
    b.register_compound("H₂O", info("Dihydrogen monoxide", "Water"));
    b.register_compound("NaCl", info("Sodium chloride", "Salt"));
    b.register_compound("OH", info("Hydroxyl", "Hydroxyl Radical"));
    b.register_compound("NaOH", info("Sodium Hydroxide", "Caustic Soda (Lye)"));
    b.register_compound("HCl", info("Hydrogen Chloride", "Hydrochloric Acid"));
    b.register_compound("Cl", info("Chlorine", "Chlorine Atom"));

    b.register_reaction(&[("H", 2)], &[("H₂", 1)], "2H → H₂");
    b.register_reaction(&[("O", 2)], &[("O₂", 1)], "2O → O₂");
    b.register_reaction(&[("H", 2), ("O", 1)], &[("H₂O", 1)], "2H + O → H₂O");
    b.register_reaction(&[("Na", 1), ("Cl", 1)], &[("NaCl", 1)], "Na + Cl → NaCl");
    b.register_reaction(&[("H", 1), ("O", 1)], &[("OH", 1)], "H + O → OH");
    b.register_reaction(
        &[("NaCl", 1), ("OH", 1)],
        &[("NaOH", 1), ("Cl", 1)],
        "NaCl + OH → NaOH + Cl",
    );
    b.register_reaction(
        &[("NaCl", 1), ("H₂O", 1)],
        &[("NaOH", 1), ("HCl", 1)],
        "NaCl + H₂O → NaOH + HCl",
    );
    b.register_reaction(&[("H₂", 2), ("O₂", 1)], &[("H₂O", 2)], "2H₂ + O₂ → 2H₂O");
    b.register_reaction(&[("OH", 1), ("H", 1)], &[("H₂O", 1)], "OH + H → H₂O");
    b.register_reaction(&[("H", 1), ("Cl", 1)], &[("HCl", 1)], "H + Cl → HCl");
    b.register_reaction(
        &[("HCl", 1), ("NaOH", 1)],
        &[("NaCl", 1), ("H₂O", 1)],
        "HCl + NaOH → NaCl + H₂O",
    );
    b.register_reaction(
        &[("Na", 2), ("H₂O", 2)],
        &[("NaOH", 2), ("H₂", 1)],
        "2Na + 2H₂O → 2NaOH + H₂",
    );
    b.build().expect("lab catalog is valid")
}

// ===========================================================================
// Workspaces
// ===========================================================================

/// A workspace over [`lab_catalog`] with default config.
pub fn lab_workspace() -> Workspace {
    Workspace::new(Arc::new(lab_catalog()), WorkspaceConfig::default())
        .expect("default config is valid")
}

pub fn water_workspace() -> Workspace {
    Workspace::new(Arc::new(water_catalog()), WorkspaceConfig::default())
        .expect("default config is valid")
}

/// Place each `(symbol, x, y)` without resolving and return the new ids
/// in order.
pub fn place_all(ws: &mut Workspace, items: &[(&str, f64, f64)]) -> Vec<ItemId> {
    items
        .iter()
        .map(|(symbol, x, y)| {
            ws.place_item(symbol, pos(*x, *y))
                .expect("symbol is a catalog element")
        })
        .collect()
}

/// Formulas of the live compound items, sorted.
pub fn compound_formulas(ws: &Workspace) -> Vec<String> {
    let mut formulas: Vec<String> = ws.compounds().map(|i| i.symbol.clone()).collect();
    formulas.sort();
    formulas
}

/// Symbols of the live element items, sorted.
pub fn element_symbols(ws: &Workspace) -> Vec<String> {
    let mut symbols: Vec<String> = ws.elements().map(|i| i.symbol.clone()).collect();
    symbols.sort();
    symbols
}

// ===========================================================================
// Lessons
// ===========================================================================

/// A quiz lesson (salt) and a build-the-target lesson (hydrogen gas).
pub fn sample_lessons() -> Vec<Lesson> {
    vec![
        Lesson {
            id: LessonId(0),
            title: "Salt".to_string(),
            target_formula: Some("NaCl".to_string()),
            hint: Some("Try dragging Sodium (Na) and Chlorine (Cl) together.".to_string()),
            quiz: Some(Quiz {
                question: "Which two elements combine to form salt?".to_string(),
                options: vec![
                    "Na and Cl".to_string(),
                    "H and O".to_string(),
                    "Na and O".to_string(),
                ],
                correct: "Na and Cl".to_string(),
            }),
        },
        Lesson {
            id: LessonId(1),
            title: "Hydrogen Gas".to_string(),
            target_formula: Some("H₂".to_string()),
            hint: Some("Bring two Hydrogen atoms close together.".to_string()),
            quiz: None,
        },
    ]
}
