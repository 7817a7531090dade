//! Autopatch Core - line diff engine and fix-request plumbing
//!
//! This library computes minimal line diffs between a source file and a
//! corrected version of it, and models the request that produces the
//! corrected version.

pub mod change;
pub mod diff;
pub mod fix;
pub mod line;
pub mod session;
pub mod source;

pub use change::{ChangeKind, DiffRun};
pub use diff::{compute_diff, DiffEngine, DiffError, DiffResult, DEFAULT_MAX_CELLS};
pub use fix::{BugReport, CodeFixer, FixError, FixResult};
pub use line::Line;
pub use session::{Failure, Pending, Session, SessionError, ANALYSIS_FAILED};
pub use source::{SourceError, SourceFile};
