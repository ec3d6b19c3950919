//! Headless runner: replays every session, prints what happened and the
//! final workspace snapshot.
//!
//! Run with: `cargo run --package chemlab-demo --bin chemlab-headless -- [sessions-dir]`
//! (`RUST_LOG=debug` shows engine logging.)

use chemlab_demo::session::{LabContent, load_sessions, run_checked};
use chemlab_demo::DemoError;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/sessions")));

    if let Err(e) = run(&dir) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(dir: &std::path::Path) -> Result<(), DemoError> {
    let content = LabContent::standard()?;
    let sessions = load_sessions(dir)?;
    println!(
        "=== Chemlab ===\n{} elements, {} compounds, {} reactions\n",
        content.catalog.element_count(),
        content.catalog.compound_count(),
        content.catalog.reaction_count()
    );

    for (path, session) in &sessions {
        println!("--- {} ({}) ---", session.title, path.display());
        if !session.description.is_empty() {
            println!("    {}", session.description);
        }

        let outcome = run_checked(session, &content)?;
        if let Some(hint) = &outcome.hint {
            println!("    hint: {hint}");
        }
        for line in &outcome.journal {
            println!("    {line}");
        }
        println!(
            "    {} items left, lessons {:.0}% complete",
            outcome.snapshot.items.len(),
            outcome.progress.overall_percent()
        );
        println!("    Determinism: PASS");
        println!("{}\n", outcome.snapshot_json()?);
    }

    println!("All {} sessions passed.", sessions.len());
    Ok(())
}
