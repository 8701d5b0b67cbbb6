//! Error types for docsnap.

use std::path::PathBuf;

use crate::filter::FilterError;
use crate::output::OutputError;
use crate::walker::WalkError;

/// Top-level error type for docsnap operations.
///
/// Everything here is a configuration or I/O problem reported before (or
/// instead of) a report. Per-file and per-directory failures never surface
/// as errors; they degrade inside the report.
#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    #[error("root does not exist or is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("focus does not exist or is not a directory: {0}")]
    FocusNotDirectory(PathBuf),

    #[error("focus must be inside root.\nroot={root}\nfocus={focus}")]
    FocusOutsideRoot { root: PathBuf, focus: PathBuf },

    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Map an error to its exit code.
///
/// Exit code 2 is reserved for "documentation missing" outcomes.
pub fn exit_code(error: &SnapError) -> i32 {
    match error {
        SnapError::RootNotDirectory(_) => 3,
        SnapError::FocusNotDirectory(_) => 3,
        SnapError::PathNotFound(_) => 3,
        SnapError::FocusOutsideRoot { .. } => 4,
        SnapError::Io(_) => 1,
        SnapError::Walk(_) => 1,
        SnapError::Filter(_) => 1,
        SnapError::Output(_) => 1,
    }
}
