//! Domain-level error taxonomy for regtriage.

use std::path::PathBuf;

/// regtriage domain errors.
///
/// Only [`RegtriageError::RunLogMissing`] is fatal to a run; every other
/// degraded-input condition (missing diffs file, missing per-test output
/// files, unparsable hunk headers) is handled by a documented fallback and
/// surfaced inside the report instead of here.
#[derive(Debug, thiserror::Error)]
pub enum RegtriageError {
    #[error("run log not found: {0}")]
    RunLogMissing(PathBuf),

    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for regtriage domain operations.
pub type Result<T> = std::result::Result<T, RegtriageError>;
