//! Lossy file reading for harness artifacts.
//!
//! Historical regression output can contain non-UTF8 byte sequences, so
//! every read goes through `from_utf8_lossy` — invalid sequences become the
//! replacement character instead of aborting the run.

use std::path::Path;

use crate::domain::{RegtriageError, Result};

/// Read an optional input file. Returns `None` when the file does not exist
/// or cannot be read; both degrade a single test's report entry rather than
/// failing the run.
pub fn read_text_lossy(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %err, "failed to read input file");
            }
            None
        }
    }
}

/// Read a required input file (the run log). Missing or unreadable is fatal.
pub fn read_required_lossy(path: &Path) -> Result<String> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(RegtriageError::RunLogMissing(path.to_path_buf()))
        }
        Err(err) => Err(RegtriageError::ReadFailed {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}
