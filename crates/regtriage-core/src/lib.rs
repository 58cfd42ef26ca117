//! Regtriage Core Library
//!
//! Turns SQL regression-harness artifacts (`regression.out` run logs,
//! `regression.diffs` unified diffs, and per-test output files) into
//! structured, statement-aligned XML reports.

pub mod align;
pub mod diff_blocks;
pub mod domain;
pub mod hunks;
pub mod input;
pub mod layout;
pub mod pipeline;
pub mod report;
pub mod run_log;
pub mod segment;
pub mod summarize;
pub mod telemetry;

pub use align::{
    align_hunks, can_align, compare_files, unified_diff, CompareStatus, ExpectedResolver,
    FileComparison,
};

pub use domain::{
    Hunk, HunkLine, MismatchEntry, RegtriageError, Result, Step, TestCaseResult, TestStatus,
};

pub use diff_blocks::split_diff_blocks;
pub use hunks::parse_hunks;
pub use layout::{resolve_path, timestamped_report_name, ExpectedMode, HarnessLayout};
pub use pipeline::{
    run_compare, run_convert, write_report, write_summary_json, CompareOptions, CompareReport,
    ConvertReport, RunSummaryArtifact, COMPARE_SUITE_NAME, CONVERT_SUITE_NAME,
};
pub use report::{CaseOutcome, TestCaseReport, XmlElement};
pub use run_log::{failing_tests, parse_run_log};
pub use segment::{KeywordSegmenter, StatementSegmenter};
pub use summarize::summarize_diff;
pub use telemetry::init_tracing;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
