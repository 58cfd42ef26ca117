//! Domain models for regtriage.
//!
//! Canonical definitions for the core entities:
//! - `TestCaseResult`: one pass/fail row from the run log
//! - `Step`: a heuristically detected statement region in an output file
//! - `Hunk`: one `@@ ... @@` region of a unified diff
//! - `MismatchEntry`: a hunk aligned to the statement that produced it

pub mod error;
pub mod hunk;
pub mod mismatch;
pub mod step;
pub mod test_case;

// Re-export main types and errors
pub use error::{RegtriageError, Result};
pub use hunk::{Hunk, HunkLine};
pub use mismatch::{
    MismatchEntry, FULL_OUTPUT_LABEL, NO_ACTUAL_PLACEHOLDER, NO_EXPECTED_PLACEHOLDER,
};
pub use step::Step;
pub use test_case::{TestCaseResult, TestStatus};
