//! Headless session runner for the Chemlab engine.
//!
//! Loads scripted lab sessions from data files, replays them against a
//! fresh workspace and checks the final state. Each session is replayed
//! twice to confirm the outcome is deterministic.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chemlab_demo::session::{LabContent, load_sessions, run_checked};
//!
//! let content = LabContent::standard()?;
//! for (_, session) in load_sessions(Path::new("sessions/"))? {
//!     let outcome = run_checked(&session, &content)?;
//!     println!("{}", outcome.snapshot_json()?);
//! }
//! ```

pub mod error;
pub mod session;
pub mod session_schema;

pub use error::DemoError;
pub use session::{LabContent, SessionOutcome, load_sessions, run_checked, run_session, verify};
pub use session_schema::{Expectations, ItemRef, SessionData, Step};
