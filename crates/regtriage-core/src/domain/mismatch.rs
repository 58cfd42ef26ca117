//! Aligned expected/actual text pairs for one divergent region.

use serde::{Deserialize, Serialize};

use super::hunk::Hunk;

/// Synthetic step label used by the full-file comparison fallback.
pub const FULL_OUTPUT_LABEL: &str = "(full output)";

/// Placeholder when a hunk has no expected-side lines.
pub const NO_EXPECTED_PLACEHOLDER: &str = "(no expected output for this hunk)";

/// Placeholder when a hunk has no actual-side lines.
pub const NO_ACTUAL_PLACEHOLDER: &str = "(no actual output for this hunk)";

/// One aligned mismatch: the statement a diff hunk was mapped to, plus the
/// expected-only and actual-only text of that hunk.
///
/// `sql` carries the matched step's text verbatim, or a synthetic label
/// (`(hunk at actual line N)`, `(full output)`) when alignment was not
/// possible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MismatchEntry {
    pub sql: String,
    pub expected: String,
    pub actual: String,
}

impl MismatchEntry {
    /// Build an entry from one hunk's one-sided lines.
    ///
    /// Context lines are excluded; an empty side gets a placeholder so the
    /// report never shows a blank cell for a real hunk.
    pub fn from_hunk(sql: impl Into<String>, hunk: &Hunk) -> Self {
        let expected = hunk.expected_lines().join("\n").trim().to_string();
        let actual = hunk.actual_lines().join("\n").trim().to_string();
        Self {
            sql: sql.into(),
            expected: if expected.is_empty() {
                NO_EXPECTED_PLACEHOLDER.to_string()
            } else {
                expected
            },
            actual: if actual.is_empty() {
                NO_ACTUAL_PLACEHOLDER.to_string()
            } else {
                actual
            },
        }
    }

    /// Synthetic whole-file entry for the degraded path where no structural
    /// alignment is possible.
    pub fn full_output(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            sql: FULL_OUTPUT_LABEL.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
