//! Harness directory layout and path normalization.
//!
//! A run lives in one directory: `regression.out` and `regression.diffs` at
//! the top, with `results/`, `expected/`, `ora_expected/` and `sql/`
//! subdirectories. The CLI may point at either the run log itself or the
//! directory containing it; everything else resolves relative to that base.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::align::ExpectedResolver;

/// Which expected-directory convention a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedMode {
    /// Stock convention: `expected/` only (with `ora_expected/` as a last
    /// resort when a file is absent).
    Pg,
    /// Oracle-compatibility runs: `ora_expected/` first, including the
    /// `expected_<test>.out` naming fallback, then `expected/`.
    Oracle,
}

/// Resolved input layout for the recorded-diff pipeline.
#[derive(Debug, Clone)]
pub struct HarnessLayout {
    pub base_dir: PathBuf,
    pub run_log: PathBuf,
    pub diffs: PathBuf,
    pub mode: ExpectedMode,
}

impl HarnessLayout {
    /// Normalize CLI inputs into concrete paths.
    ///
    /// `run_log` may be the log file or a directory containing
    /// `regression.out`. `base_dir` overrides the default base (the run
    /// log's parent). The diffs path resolves against the base.
    pub fn locate(
        run_log: &Path,
        diffs: &Path,
        base_dir: Option<&Path>,
        mode: ExpectedMode,
    ) -> Self {
        let mut base = match base_dir {
            Some(dir) => dir.to_path_buf(),
            None => match run_log.parent() {
                Some(parent) if parent != Path::new("") => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        };

        let candidate = resolve_path(&base, run_log);
        let run_log = if candidate.is_dir() {
            base = candidate.clone();
            candidate.join("regression.out")
        } else {
            candidate
        };
        let diffs = resolve_path(&base, diffs);

        Self {
            base_dir: base,
            run_log,
            diffs,
            mode,
        }
    }

    pub fn results_dir(&self) -> PathBuf {
        self.base_dir.join("results")
    }

    pub fn sql_dir(&self) -> PathBuf {
        self.base_dir.join("sql")
    }

    /// Expected-file resolver for this layout's mode.
    pub fn expected_resolver(&self) -> ExpectedResolver {
        let expected = self.base_dir.join("expected");
        let oracle = self.base_dir.join("ora_expected");
        match self.mode {
            ExpectedMode::Pg => ExpectedResolver::with_fallback(expected, oracle),
            ExpectedMode::Oracle => ExpectedResolver::oracle_override(oracle, expected),
        }
    }
}

/// Resolve a possibly-relative path against a base directory.
pub fn resolve_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

/// Auto-generated output filename for a report written at `now`.
pub fn timestamped_report_name(now: DateTime<Local>) -> String {
    format!("regression_report_{}.xml", now.format("%Y%m%d_%H%M%S"))
}
