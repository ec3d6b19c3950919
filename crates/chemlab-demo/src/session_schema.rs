use chemlab_core::config::WorkspaceConfig;
use chemlab_core::id::LessonId;
use serde::Deserialize;

/// A scripted lab session loaded from `sessions/*.ron`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionData {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Overrides for the workspace tunables.
    #[serde(default)]
    pub config: WorkspaceConfig,
    /// Guided lesson started before the first step.
    #[serde(default)]
    pub lesson: Option<LessonId>,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub expect: Expectations,
}

/// Identifies a live item for steps that act on one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum ItemRef {
    /// The item created by the n-th `Add` or `Place` step (0-based).
    Placed(usize),
    /// The oldest live item with this symbol or formula.
    First(String),
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum Step {
    /// Drop an element and let it react.
    Add { symbol: String, at: (f64, f64) },
    /// Drop an element without resolving.
    Place { symbol: String, at: (f64, f64) },
    /// Run one resolution pass.
    Resolve,
    /// Drag an item to a new position and release it there.
    Drag { item: ItemRef, to: (f64, f64) },
    /// Split a compound back into what it was made from.
    Break { item: ItemRef },
    Remove { item: ItemRef },
    Answer { lesson: LessonId, answer: String },
}

/// Checked against the final state of the replay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Expectations {
    /// Formulas that must have been discovered.
    #[serde(default)]
    pub discovered: Vec<String>,
    /// Badges that must have been unlocked.
    #[serde(default)]
    pub badges: Vec<String>,
    /// Exact number of items left on the canvas.
    #[serde(default)]
    pub items: Option<usize>,
    #[serde(default)]
    pub completed_lessons: Vec<LessonId>,
}
