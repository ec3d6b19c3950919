use std::path::Path;

use chemlab_core::id::LessonId;
use chemlab_core::progress::LessonStatus;
use chemlab_demo::session::{LabContent, load_sessions, run_checked, run_session};
use chemlab_demo::session_schema::SessionData;

fn sessions_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/sessions"))
}

fn load(title: &str) -> SessionData {
    load_sessions(sessions_dir())
        .unwrap()
        .into_iter()
        .map(|(_, data)| data)
        .find(|data| data.title == title)
        .unwrap_or_else(|| panic!("session '{title}' not bundled"))
}

// -----------------------------------------------------------------------
// Bundled sessions
// -----------------------------------------------------------------------

#[test]
fn bundled_sessions_load_in_file_order() {
    let sessions = load_sessions(sessions_dir()).unwrap();
    let titles: Vec<_> = sessions.iter().map(|(_, s)| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Water", "Salt Master", "Break and Rebuild", "Lye and Neutralization"]
    );
}

#[test]
fn every_bundled_session_passes() {
    let content = LabContent::standard().unwrap();
    for (path, session) in load_sessions(sessions_dir()).unwrap() {
        if let Err(e) = run_checked(&session, &content) {
            panic!("{} failed: {e}", path.display());
        }
    }
}

// -----------------------------------------------------------------------
// Individual sessions
// -----------------------------------------------------------------------

#[test]
fn water_session_completes_its_lesson() {
    let content = LabContent::standard().unwrap();
    let outcome = run_session(&load("Water"), &content).unwrap();
    assert_eq!(outcome.snapshot.history, vec!["H₂O".to_string()]);
    assert_eq!(
        outcome.progress.status(LessonId(1)),
        Some(LessonStatus::Completed)
    );
    assert!(outcome.hint.unwrap().contains("Water"));
}

#[test]
fn salt_session_journal() {
    let content = LabContent::standard().unwrap();
    let outcome = run_session(&load("Salt Master"), &content).unwrap();
    assert_eq!(
        outcome.journal,
        vec![
            "discovered NaCl".to_string(),
            "badge Salt Master".to_string(),
            "answered lesson 0 (wrong)".to_string(),
            "answered lesson 0 (correct)".to_string(),
        ]
    );
}

#[test]
fn lye_session_history_follows_reaction_chain() {
    let content = LabContent::standard().unwrap();
    let outcome = run_session(&load("Lye and Neutralization"), &content).unwrap();
    assert_eq!(
        outcome.snapshot.history,
        vec!["NaCl", "OH", "NaOH", "Cl", "HCl", "NaCl", "H₂O"]
    );
    let mut left: Vec<_> = outcome
        .snapshot
        .items
        .iter()
        .map(|i| i.symbol.as_str())
        .collect();
    left.sort();
    assert_eq!(left, vec!["H₂O", "NaCl"]);
}

#[test]
fn snapshot_json_lists_items() {
    let content = LabContent::standard().unwrap();
    let outcome = run_session(&load("Break and Rebuild"), &content).unwrap();
    let json: serde_json::Value = serde_json::from_str(&outcome.snapshot_json().unwrap()).unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["items"][0]["symbol"], "H₂");
    assert_eq!(json["discovered"][0], "H₂");
}
