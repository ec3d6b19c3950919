//! Replays scripted sessions against a fresh workspace.

use crate::error::DemoError;
use crate::session_schema::{Expectations, ItemRef, SessionData, Step};
use chemlab_core::badge::{BadgeRule, RuleBadgePolicy};
use chemlab_core::catalog::Catalog;
use chemlab_core::event::{Event, EventKind};
use chemlab_core::id::ItemId;
use chemlab_core::position::Position;
use chemlab_core::progress::{Lesson, LessonStatus, ProgressTracker};
use chemlab_core::workspace::{Workspace, WorkspaceSnapshot};
use chemlab_data::loader::{deserialize_file, detect_format};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// Everything a replay needs besides the script itself.
#[derive(Debug, Clone)]
pub struct LabContent {
    pub catalog: Arc<Catalog>,
    pub lessons: Vec<Lesson>,
    pub badge_rules: Vec<BadgeRule>,
}

impl LabContent {
    /// The bundled catalog, lessons and badges.
    pub fn standard() -> Result<Self, DemoError> {
        Ok(Self {
            catalog: Arc::new(chemlab_data::standard_catalog()?),
            lessons: chemlab_data::standard_lessons()?,
            badge_rules: chemlab_data::standard_badge_rules()?,
        })
    }
}

/// Final state of one replay.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub title: String,
    pub snapshot: WorkspaceSnapshot,
    /// Human-readable log of discoveries, badges and breaks, in order.
    pub journal: Vec<String>,
    pub progress: ProgressTracker,
    /// Hint of the guided lesson, if the session started one.
    pub hint: Option<String>,
}

impl SessionOutcome {
    pub fn snapshot_json(&self) -> Result<String, DemoError> {
        serde_json::to_string_pretty(&self.snapshot).map_err(|e| DemoError::Serialization {
            detail: e.to_string(),
        })
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load every session file in `dir`, sorted by file name. Files in formats
/// the loader does not know are skipped.
pub fn load_sessions(dir: &Path) -> Result<Vec<(PathBuf, SessionData)>, DemoError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && detect_format(path).is_ok())
        .collect();
    paths.sort();

    let mut sessions = Vec::with_capacity(paths.len());
    for path in paths {
        let data: SessionData = deserialize_file(&path)?;
        log::debug!("loaded session '{}' from {}", data.title, path.display());
        sessions.push((path, data));
    }
    Ok(sessions)
}

// ===========================================================================
// Replay
// ===========================================================================

fn resolve_ref(ws: &Workspace, placed: &[ItemId], item: &ItemRef) -> Result<ItemId, DemoError> {
    match item {
        ItemRef::Placed(index) => placed
            .get(*index)
            .copied()
            .ok_or(DemoError::UnknownPlacement {
                index: *index,
                placed: placed.len(),
            }),
        ItemRef::First(symbol) => ws
            .items()
            .iter()
            .find(|i| &i.symbol == symbol)
            .map(|i| i.id)
            .ok_or_else(|| DemoError::NoSuchItem {
                symbol: symbol.clone(),
            }),
    }
}

/// Replay `session` on a new workspace built from `content`.
pub fn run_session(session: &SessionData, content: &LabContent) -> Result<SessionOutcome, DemoError> {
    let progress = Rc::new(RefCell::new(ProgressTracker::new(content.lessons.clone())?));
    let journal = Rc::new(RefCell::new(Vec::new()));

    let mut ws = Workspace::new(Arc::clone(&content.catalog), session.config.clone())?
        .with_badge_policy(Box::new(RuleBadgePolicy::new(content.badge_rules.clone())));

    let sink = Rc::clone(&journal);
    ws.on_event(
        EventKind::CompoundDiscovered,
        Box::new(move |event| {
            if let Event::CompoundDiscovered { formula, .. } = event {
                sink.borrow_mut().push(format!("discovered {formula}"));
            }
        }),
    );
    let sink = Rc::clone(&journal);
    ws.on_event(
        EventKind::BadgeUnlocked,
        Box::new(move |event| {
            if let Event::BadgeUnlocked { badge, .. } = event {
                sink.borrow_mut().push(format!("badge {badge}"));
            }
        }),
    );
    let sink = Rc::clone(&journal);
    ws.on_event(
        EventKind::CompoundBroken,
        Box::new(move |event| {
            if let Event::CompoundBroken { restored, .. } = event {
                sink.borrow_mut()
                    .push(format!("broke a compound into {} parts", restored.len()));
            }
        }),
    );
    let tracker = Rc::clone(&progress);
    let sink = Rc::clone(&journal);
    ws.on_event(
        EventKind::ItemsProduced,
        Box::new(move |event| {
            if let Event::ItemsProduced { units, .. } = event {
                for unit in units {
                    for lesson in tracker.borrow_mut().observe_production(&unit.formula) {
                        sink.borrow_mut().push(format!("completed lesson {}", lesson.0));
                    }
                }
            }
        }),
    );

    let mut hint = None;
    if let Some(lesson) = session.lesson {
        let mut tracker = progress.borrow_mut();
        tracker.start(lesson)?;
        hint = tracker.guided_hint(lesson).map(str::to_string);
    }

    let mut placed = Vec::new();
    for step in &session.steps {
        match step {
            Step::Add { symbol, at } => {
                let placement = ws.add_item(symbol, Position::new(at.0, at.1))?;
                placed.push(placement.item);
            }
            Step::Place { symbol, at } => {
                placed.push(ws.place_item(symbol, Position::new(at.0, at.1))?);
            }
            Step::Resolve => {
                ws.resolve_all();
            }
            Step::Drag { item, to } => {
                let id = resolve_ref(&ws, &placed, item)?;
                ws.finish_drag(id, Position::new(to.0, to.1))?;
            }
            Step::Break { item } => {
                let id = resolve_ref(&ws, &placed, item)?;
                ws.break_compound(id)?;
            }
            Step::Remove { item } => {
                let id = resolve_ref(&ws, &placed, item)?;
                ws.remove_item(id)?;
            }
            Step::Answer { lesson, answer } => {
                let correct = progress.borrow_mut().answer_quiz(*lesson, answer)?;
                let verdict = if correct { "correct" } else { "wrong" };
                journal
                    .borrow_mut()
                    .push(format!("answered lesson {} ({verdict})", lesson.0));
            }
        }
    }

    let snapshot = ws.snapshot();
    drop(ws);

    let journal = journal.borrow().clone();
    let progress = progress.borrow().clone();
    Ok(SessionOutcome {
        title: session.title.clone(),
        snapshot,
        journal,
        progress,
        hint,
    })
}

// ===========================================================================
// Verification
// ===========================================================================

/// Check the outcome against what the session expects.
pub fn verify(outcome: &SessionOutcome, expect: &Expectations) -> Result<(), DemoError> {
    let fail = |detail: String| DemoError::ExpectationFailed {
        session: outcome.title.clone(),
        detail,
    };
    let snapshot = &outcome.snapshot;

    for formula in &expect.discovered {
        if !snapshot.discovered.contains(formula) {
            return Err(fail(format!("{formula} was never discovered")));
        }
    }
    for badge in &expect.badges {
        if !snapshot.badges.contains(badge) {
            return Err(fail(format!("badge '{badge}' was not unlocked")));
        }
    }
    if let Some(count) = expect.items
        && snapshot.items.len() != count
    {
        return Err(fail(format!(
            "expected {count} items on the canvas, found {}",
            snapshot.items.len()
        )));
    }
    for lesson in &expect.completed_lessons {
        if outcome.progress.status(*lesson) != Some(LessonStatus::Completed) {
            return Err(fail(format!("lesson {} is not completed", lesson.0)));
        }
    }
    Ok(())
}

/// Replay twice, require identical snapshots, then verify expectations.
pub fn run_checked(session: &SessionData, content: &LabContent) -> Result<SessionOutcome, DemoError> {
    let first = run_session(session, content)?;
    let second = run_session(session, content)?;
    if first.snapshot_json()? != second.snapshot_json()? {
        return Err(DemoError::Nondeterministic {
            session: session.title.clone(),
        });
    }
    verify(&first, &session.expect)?;
    Ok(first)
}
