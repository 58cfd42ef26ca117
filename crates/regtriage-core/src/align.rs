//! Alignment engine: maps diff hunks onto the statements that produced them.
//!
//! Two modes share this module. The recorded-diff mode aligns pre-parsed
//! hunks against segmented steps of the actual output file, falling back to
//! a whole-file comparison when structure is missing. The self-computed mode
//! recomputes a unified diff per failing test and reports at file
//! granularity — coarser, but available without a recorded diffs file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use crate::domain::{Hunk, MismatchEntry, Step};
use crate::input::read_text_lossy;

/// Map each hunk onto the actual-file step containing its start line.
///
/// Step ranges are disjoint and ascending by construction, so a linear scan
/// for the first containing step finds the only possible match. A hunk whose
/// start falls outside every step still yields an entry with a positional
/// label — hunks are never silently dropped.
pub fn align_hunks(hunks: &[Hunk], actual_steps: &[Step]) -> Vec<MismatchEntry> {
    hunks
        .iter()
        .map(|hunk| {
            let label = actual_steps
                .iter()
                .find(|step| step.contains_line(hunk.actual_start))
                .map(|step| step.sql.clone())
                .unwrap_or_else(|| format!("(hunk at actual line {})", hunk.actual_start));
            MismatchEntry::from_hunk(label, hunk)
        })
        .collect()
}

/// Whether statement-level alignment is possible at all.
///
/// With no hunks (empty or absent diff) or no detected steps the engine
/// skips straight to the full-file fallback.
pub fn can_align(hunks: &[Hunk], actual_steps: &[Step]) -> bool {
    !hunks.is_empty() && !actual_steps.is_empty()
}

// ---------------------------------------------------------------------------
// Expected-file resolution
// ---------------------------------------------------------------------------

/// Pluggable lookup for a test's expected-output file.
///
/// Harness layouts differ: the stock convention keeps `expected/<test>.out`,
/// while oracle-compatibility runs override selected files from an
/// `ora_expected` directory, sometimes under the alternate
/// `expected_<test>.out` naming produced by triage workflows.
#[derive(Debug, Clone)]
pub struct ExpectedResolver {
    primary: PathBuf,
    secondary: Option<PathBuf>,
    alt_naming: bool,
}

impl ExpectedResolver {
    /// Plain lookup: `<dir>/<test>.out` only.
    pub fn plain(dir: impl Into<PathBuf>) -> Self {
        Self {
            primary: dir.into(),
            secondary: None,
            alt_naming: false,
        }
    }

    /// Plain lookup with a fallback directory tried when the primary file
    /// is missing.
    pub fn with_fallback(primary: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            secondary: Some(fallback.into()),
            alt_naming: false,
        }
    }

    /// Oracle-override lookup: `<oracle>/<test>.out`, then the
    /// `<oracle>/expected_<test>.out` naming fallback, then the plain dir.
    pub fn oracle_override(oracle_dir: impl Into<PathBuf>, plain_dir: impl Into<PathBuf>) -> Self {
        Self {
            primary: oracle_dir.into(),
            secondary: Some(plain_dir.into()),
            alt_naming: true,
        }
    }

    /// Resolve the expected file for `test`.
    ///
    /// Returns the first candidate that exists, or the primary candidate
    /// path when none does — callers surface the missing file themselves.
    pub fn resolve(&self, test: &str) -> PathBuf {
        let primary = self.primary.join(format!("{test}.out"));
        if primary.exists() {
            return primary;
        }
        if self.alt_naming {
            let alt = self.primary.join(format!("expected_{test}.out"));
            if alt.exists() {
                return alt;
            }
        }
        if let Some(secondary) = &self.secondary {
            let fallback = secondary.join(format!("{test}.out"));
            if fallback.exists() {
                return fallback;
            }
        }
        primary
    }
}

// ---------------------------------------------------------------------------
// Self-computed diff mode
// ---------------------------------------------------------------------------

/// File-level outcome of one self-computed comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompareStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "diff")]
    Diff,
    #[serde(rename = "missing_expected")]
    MissingExpected,
    #[serde(rename = "missing_actual")]
    MissingActual,
}

impl CompareStatus {
    pub fn is_failure(self) -> bool {
        !matches!(self, CompareStatus::Ok)
    }
}

/// Result of comparing one test's expected and actual files directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileComparison {
    pub test: String,
    pub status: CompareStatus,
    /// Short failure message ("diff found", "missing expected: <path>", ...).
    pub message: String,
    /// Console-style narrative: resolved paths plus the diff or "no diff".
    pub output: String,
    pub expected_text: String,
    pub actual_text: String,
}

/// Compute a unified diff between two texts, `context` lines of context.
pub fn unified_diff(expected: &str, actual: &str, from: &str, to: &str, context: usize) -> String {
    TextDiff::from_lines(expected, actual)
        .unified_diff()
        .context_radius(context)
        .header(from, to)
        .to_string()
}

/// Compare one test's files without statement-level alignment.
///
/// Missing files produce `MissingExpected`/`MissingActual` outcomes with
/// whatever side could still be read; identical contents produce `Ok`.
pub fn compare_files(
    test: &str,
    sql_path: &Path,
    expected_path: &Path,
    actual_path: &Path,
    context: usize,
) -> FileComparison {
    let mut output_lines = vec![
        format!("step: {}", sql_path.display()),
        format!("expected: {}", expected_path.display()),
        format!("actual: {}", actual_path.display()),
    ];

    let expected_text = read_text_lossy(expected_path);
    let actual_text = read_text_lossy(actual_path);

    match (expected_text, actual_text) {
        (None, actual) => {
            let message = format!("missing expected: {}", expected_path.display());
            FileComparison {
                test: test.to_string(),
                status: CompareStatus::MissingExpected,
                message,
                output: output_lines.join("\n"),
                expected_text: String::new(),
                actual_text: actual.unwrap_or_default(),
            }
        }
        (Some(expected), None) => {
            let message = format!("missing actual: {}", actual_path.display());
            FileComparison {
                test: test.to_string(),
                status: CompareStatus::MissingActual,
                message,
                output: output_lines.join("\n"),
                expected_text: expected,
                actual_text: String::new(),
            }
        }
        (Some(expected), Some(actual)) => {
            let (status, message) = if expected == actual {
                output_lines.push("no diff".to_string());
                (CompareStatus::Ok, String::new())
            } else {
                let diff = unified_diff(
                    &expected,
                    &actual,
                    &expected_path.display().to_string(),
                    &actual_path.display().to_string(),
                    context,
                );
                output_lines.push(diff);
                (CompareStatus::Diff, "diff found".to_string())
            };
            FileComparison {
                test: test.to_string(),
                status,
                message,
                output: output_lines.join("\n"),
                expected_text: expected,
                actual_text: actual,
            }
        }
    }
}
