//! Unified-diff hunks as parsed from a per-test diff blob.

use serde::{Deserialize, Serialize};

/// One tagged line inside a hunk body.
///
/// `---`/`+++` file-header lines are never represented here; the hunk
/// parser drops them even when they appear mid-hunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum HunkLine {
    /// Unchanged context line (leading ` ` stripped).
    Context(String),
    /// Line present only in the expected file (leading `-` stripped).
    ExpectedOnly(String),
    /// Line present only in the actual file (leading `+` stripped).
    ActualOnly(String),
}

/// One `@@ -e,el +a,al @@` region of a unified diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hunk {
    /// 1-indexed start line in the expected file.
    pub expected_start: usize,

    /// Expected-side length; absent lengths default to 1 per the unified
    /// diff convention.
    pub expected_len: usize,

    /// 1-indexed start line in the actual file.
    pub actual_start: usize,

    /// Actual-side length (same default rule).
    pub actual_len: usize,

    /// Tagged body lines in appearance order.
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    /// Lines present only in the expected file.
    pub fn expected_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                HunkLine::ExpectedOnly(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Lines present only in the actual file.
    pub fn actual_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                HunkLine::ActualOnly(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}
