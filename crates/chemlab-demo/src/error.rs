use chemlab_core::progress::ProgressError;
use chemlab_core::workspace::WorkspaceError;
use chemlab_data::DataLoadError;

/// Errors that can occur while replaying a session.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Loading the catalog, lessons or a session file failed.
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    /// A step was rejected by the workspace.
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// A quiz answer or lesson start named an unknown lesson.
    #[error("lesson error: {0}")]
    Progress(#[from] ProgressError),

    /// A step referenced a placement that has not happened yet.
    #[error("step refers to placement #{index}, but only {placed} items were placed")]
    UnknownPlacement { index: usize, placed: usize },

    /// A step referenced a symbol with no live item on the canvas.
    #[error("no item with symbol '{symbol}' on the canvas")]
    NoSuchItem { symbol: String },

    /// The final state did not match the session's expectations.
    #[error("session '{session}' failed: {detail}")]
    ExpectationFailed { session: String, detail: String },

    /// Two replays of the same session ended in different states.
    #[error("session '{session}' is not deterministic")]
    Nondeterministic { session: String },

    /// Serialization error.
    #[error("serialization error: {detail}")]
    Serialization { detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
