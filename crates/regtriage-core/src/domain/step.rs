//! Heuristically detected statement regions within one output file.

use serde::{Deserialize, Serialize};

/// A single statement "step": the SQL text at a boundary line plus every
/// following line up to (not including) the next boundary.
///
/// Line numbers are 1-indexed and inclusive, and always refer to one
/// specific file — steps from the expected and actual files are never
/// merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    /// Trimmed statement text (boundary line plus continuation lines).
    pub sql: String,

    /// First line of the step, 1-indexed.
    pub start_line: usize,

    /// Last line of the step, 1-indexed, inclusive.
    pub end_line: usize,
}

impl Step {
    /// Whether a 1-indexed line number falls inside this step's range.
    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}
