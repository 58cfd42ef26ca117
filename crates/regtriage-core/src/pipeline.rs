//! End-to-end orchestration for both report pipelines.
//!
//! `run_convert` consumes a recorded run (`regression.out` plus
//! `regression.diffs`) and produces the statement-aligned report.
//! `run_compare` recomputes diffs for failing tests directly from the
//! expected and results files — coarser output, no recorded diffs needed.
//! Both share segmentation, sanitization and XML serialization.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::align::{align_hunks, can_align, compare_files, ExpectedResolver, FileComparison};
use crate::diff_blocks::split_diff_blocks;
use crate::domain::{MismatchEntry, RegtriageError, Result, Step, TestCaseResult};
use crate::hunks::parse_hunks;
use crate::input::{read_required_lossy, read_text_lossy};
use crate::layout::{ExpectedMode, HarnessLayout};
use crate::report::{
    aligned_narrative, build_compare_report, build_report, fallback_narrative, CaseOutcome,
    TestCaseReport,
};
use crate::run_log::{failing_tests, parse_run_log};
use crate::segment::StatementSegmenter;
use crate::summarize::summarize_diff;

/// Suite name attribute for the recorded-diff report.
pub const CONVERT_SUITE_NAME: &str = "SQL Regression Tests";

/// Suite name attribute for the self-computed report.
pub const COMPARE_SUITE_NAME: &str = "regression-compare";

// ---------------------------------------------------------------------------
// Recorded-diff pipeline
// ---------------------------------------------------------------------------

/// Output of the recorded-diff pipeline, ready for serialization.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub cases: Vec<TestCaseReport>,
}

impl ConvertReport {
    pub fn tests(&self) -> usize {
        self.cases.len()
    }

    pub fn failures(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.case.status.is_failure())
            .count()
    }

    /// Serialize to the final XML document text.
    pub fn render_xml(&self) -> String {
        build_report(&self.cases, CONVERT_SUITE_NAME).to_document()
    }

    /// Machine-readable run summary for downstream tooling.
    pub fn summary_artifact(&self, generated_at: DateTime<Utc>) -> RunSummaryArtifact {
        RunSummaryArtifact {
            schema_version: "1.0".to_string(),
            generated_at,
            tests: self.tests(),
            failures: self.failures(),
            cases: self.cases.iter().map(|c| c.case.clone()).collect(),
        }
    }
}

/// Run the recorded-diff pipeline over a resolved layout.
///
/// The run log is the single required input; a missing diffs file or
/// missing per-test output files degrade individual entries only.
pub fn run_convert(
    layout: &HarnessLayout,
    segmenter: &dyn StatementSegmenter,
) -> Result<ConvertReport> {
    let log_text = read_required_lossy(&layout.run_log)?;
    let test_cases = parse_run_log(&log_text);

    let diff_blocks = match read_text_lossy(&layout.diffs) {
        Some(text) => split_diff_blocks(&text),
        None => {
            debug!(path = %layout.diffs.display(), "no diffs file; diffs are optional evidence");
            Default::default()
        }
    };

    let resolver = layout.expected_resolver();
    let results_dir = layout.results_dir();

    let cases: Vec<TestCaseReport> = test_cases
        .into_iter()
        .map(|case| {
            let diff = diff_blocks.get(&case.name).map(String::as_str).unwrap_or("");
            build_case_report(case, diff, &results_dir, &resolver, segmenter)
        })
        .collect();

    let report = ConvertReport { cases };
    info!(
        tests = report.tests(),
        failures = report.failures(),
        "converted regression run"
    );
    Ok(report)
}

fn build_case_report(
    case: TestCaseResult,
    diff: &str,
    results_dir: &Path,
    resolver: &ExpectedResolver,
    segmenter: &dyn StatementSegmenter,
) -> TestCaseReport {
    let actual_path = results_dir.join(format!("{}.out", case.name));
    let expected_path = resolver.resolve(&case.name);

    let actual_text = read_text_lossy(&actual_path);
    let actual_output = actual_text.clone().unwrap_or_else(|| {
        format!("Actual output file not found at {}", actual_path.display())
    });

    let actual_steps = segmenter.segment_file(&actual_path);
    let expected_steps = segmenter.segment_file(&expected_path);
    let expected_text = read_text_lossy(&expected_path);

    let outcome = if case.status.is_failure() {
        let hunks = parse_hunks(diff);
        if can_align(&hunks, &actual_steps) {
            let entries = align_hunks(&hunks, &actual_steps);
            let narrative = aligned_narrative(&case.name, &entries);
            CaseOutcome::Failed { narrative, entries }
        } else {
            // Full-file fallback: no hunks, or no detectable statement
            // boundaries to align them against.
            let expected_full = expected_text
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .to_string();
            let actual_full = actual_text
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .to_string();
            let narrative = fallback_narrative(&case.name, &summarize_diff(diff));
            CaseOutcome::Failed {
                narrative,
                entries: vec![MismatchEntry::full_output(expected_full, actual_full)],
            }
        }
    } else {
        CaseOutcome::Passed {
            steps: audit_steps(
                &actual_steps,
                &expected_steps,
                expected_text.as_deref(),
                actual_text.as_deref(),
            ),
        }
    };

    TestCaseReport {
        case,
        actual_output,
        outcome,
    }
}

/// Best-effort step-level expected/actual pairs for a passing test.
///
/// Actual steps are matched to expected steps by identical SQL text; output
/// slices are taken by detected line range. When no steps were detected but
/// either file has content, a single whole-file pair keeps the audit trail.
fn audit_steps(
    actual_steps: &[Step],
    expected_steps: &[Step],
    expected_text: Option<&str>,
    actual_text: Option<&str>,
) -> Vec<MismatchEntry> {
    let expected_lines: Vec<&str> = expected_text.map(|t| t.lines().collect()).unwrap_or_default();
    let actual_lines: Vec<&str> = actual_text.map(|t| t.lines().collect()).unwrap_or_default();

    if actual_steps.is_empty() {
        if expected_lines.is_empty() && actual_lines.is_empty() {
            return Vec::new();
        }
        return vec![MismatchEntry::full_output(
            expected_text.unwrap_or("").trim(),
            actual_text.unwrap_or("").trim(),
        )];
    }

    actual_steps
        .iter()
        .map(|act_step| {
            let exp_step = expected_steps.iter().find(|es| es.sql == act_step.sql);
            let expected = if expected_lines.is_empty() {
                String::new()
            } else {
                let (start, end) = exp_step
                    .map(|es| (es.start_line, es.end_line))
                    .unwrap_or((act_step.start_line, act_step.end_line));
                slice_lines(&expected_lines, start, end)
            };
            let actual = slice_lines(&actual_lines, act_step.start_line, act_step.end_line);
            MismatchEntry {
                sql: act_step.sql.clone(),
                expected,
                actual,
            }
        })
        .collect()
}

/// Join lines `start..=end` (1-indexed, inclusive), tolerating out-of-range
/// bounds the way the detected ranges can exceed a shorter sibling file.
fn slice_lines(lines: &[&str], start: usize, end: usize) -> String {
    if lines.is_empty() || start > lines.len() || start > end {
        return String::new();
    }
    let end = end.min(lines.len());
    lines[start - 1..end].join("\n").trim().to_string()
}

// ---------------------------------------------------------------------------
// Self-computed-diff pipeline
// ---------------------------------------------------------------------------

/// Inputs for the self-computed-diff pipeline.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub base_dir: PathBuf,
    /// Run log path, relative paths resolved against `base_dir`.
    pub run_log: PathBuf,
    pub expected_dir: PathBuf,
    pub ora_expected_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Explicit test subset; empty means every failing test from the log.
    pub tests: Vec<String>,
    /// Unified-diff context lines.
    pub context: usize,
    pub mode: ExpectedMode,
}

/// Output of the self-computed-diff pipeline.
#[derive(Debug, Clone)]
pub struct CompareReport {
    pub results: Vec<FileComparison>,
}

impl CompareReport {
    pub fn tests(&self) -> usize {
        self.results.len()
    }

    pub fn failures(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status.is_failure())
            .count()
    }

    pub fn render_xml(&self) -> String {
        build_compare_report(&self.results, COMPARE_SUITE_NAME).to_document()
    }
}

/// Run the self-computed-diff pipeline.
pub fn run_compare(opts: &CompareOptions) -> Result<CompareReport> {
    let run_log = crate::layout::resolve_path(&opts.base_dir, &opts.run_log);
    let log_text = read_required_lossy(&run_log)?;

    let tests = if opts.tests.is_empty() {
        failing_tests(&parse_run_log(&log_text))
    } else {
        opts.tests.clone()
    };
    debug!(count = tests.len(), "comparing failing tests");

    let expected_dir = crate::layout::resolve_path(&opts.base_dir, &opts.expected_dir);
    let ora_dir = crate::layout::resolve_path(&opts.base_dir, &opts.ora_expected_dir);
    let results_dir = crate::layout::resolve_path(&opts.base_dir, &opts.results_dir);

    let resolver = match opts.mode {
        ExpectedMode::Pg => ExpectedResolver::plain(&expected_dir),
        ExpectedMode::Oracle => ExpectedResolver::oracle_override(&ora_dir, &expected_dir),
    };

    let results: Vec<FileComparison> = tests
        .iter()
        .map(|test| {
            let sql_path = opts.base_dir.join("sql").join(format!("{test}.sql"));
            let expected_path = resolver.resolve(test);
            let actual_path = results_dir.join(format!("{test}.out"));
            compare_files(test, &sql_path, &expected_path, &actual_path, opts.context)
        })
        .collect();

    let report = CompareReport { results };
    info!(
        tests = report.tests(),
        failures = report.failures(),
        "compared regression outputs"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Artifact writing
// ---------------------------------------------------------------------------

/// Machine-readable run summary written alongside the XML report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummaryArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub tests: usize,
    pub failures: usize,
    pub cases: Vec<TestCaseResult>,
}

/// Write the XML report document.
pub fn write_report(path: &Path, document: &str) -> Result<()> {
    std::fs::write(path, document).map_err(|source| RegtriageError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the run summary in pretty JSON format.
pub fn write_summary_json(path: &Path, artifact: &RunSummaryArtifact) -> Result<()> {
    let content = serde_json::to_string_pretty(artifact)?;
    std::fs::write(path, content).map_err(|source| RegtriageError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::CompareStatus;
    use crate::domain::TestStatus;
    use crate::segment::KeywordSegmenter;
    use std::fs;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write fixture");
    }

    #[test]
    fn test_missing_run_log_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = HarnessLayout::locate(
            &dir.path().join("regression.out"),
            Path::new("regression.diffs"),
            None,
            ExpectedMode::Pg,
        );
        let err = run_convert(&layout, &KeywordSegmenter).expect_err("missing log must fail");
        assert!(matches!(err, RegtriageError::RunLogMissing(_)));
    }

    #[test]
    fn test_convert_counts_and_fallback_without_diffs() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            &dir.path().join("regression.out"),
            "ok 1 + alpha 10 ms\nnot ok 2 + beta 20 ms\n",
        );
        write(&dir.path().join("results/alpha.out"), "SELECT 1;\n 1\n");
        write(&dir.path().join("results/beta.out"), "SELECT 2;\n 3\n");
        write(&dir.path().join("expected/beta.out"), "SELECT 2;\n 2\n");

        let layout = HarnessLayout::locate(
            dir.path(),
            Path::new("regression.diffs"),
            None,
            ExpectedMode::Pg,
        );
        let report = run_convert(&layout, &KeywordSegmenter).expect("convert");

        assert_eq!(report.tests(), 2);
        assert_eq!(report.failures(), 1);

        let beta = &report.cases[1];
        assert_eq!(beta.case.status, TestStatus::NotOk);
        match &beta.outcome {
            CaseOutcome::Failed { narrative, entries } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].sql, "(full output)");
                assert!(narrative.contains("[NO DIFF RECORDED]"));
            }
            other => panic!("expected Failed outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_aligns_hunk_to_step() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            &dir.path().join("regression.out"),
            "not ok 1 + gamma 15 ms\n",
        );
        // Actual file: banner on lines 1-2, then a step spanning lines 3-8.
        write(
            &dir.path().join("results/gamma.out"),
            "banner\nbanner\nSELECT 1;\n x \n---\nnew value\n(1 row)\ntrailing\n",
        );
        write(
            &dir.path().join("expected/gamma.out"),
            "banner\nbanner\nSELECT 1;\n x \n---\nold value\n(1 row)\ntrailing\n",
        );
        write(
            &dir.path().join("regression.diffs"),
            "diff -U3 a/expected/gamma.out b/results/gamma.out\n\
             --- a/expected/gamma.out\n\
             +++ b/results/gamma.out\n\
             @@ -5,2 +5,2 @@\n -old value\n+new value\n",
        );

        let layout = HarnessLayout::locate(
            dir.path(),
            Path::new("regression.diffs"),
            None,
            ExpectedMode::Pg,
        );
        let report = run_convert(&layout, &KeywordSegmenter).expect("convert");
        match &report.cases[0].outcome {
            CaseOutcome::Failed { entries, .. } => {
                assert_eq!(entries.len(), 1);
                assert!(entries[0].sql.starts_with("SELECT 1;"));
                assert_eq!(entries[0].actual, "new value");
            }
            other => panic!("expected Failed outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_is_deterministic() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            &dir.path().join("regression.out"),
            "ok 1 + alpha 10 ms\nnot ok 2 + beta 20 ms\n",
        );
        write(&dir.path().join("results/alpha.out"), "SELECT 1;\n 1\n");

        let layout = HarnessLayout::locate(
            dir.path(),
            Path::new("regression.diffs"),
            None,
            ExpectedMode::Oracle,
        );
        let first = run_convert(&layout, &KeywordSegmenter)
            .expect("convert")
            .render_xml();
        let second = run_convert(&layout, &KeywordSegmenter)
            .expect("convert")
            .render_xml();
        assert_eq!(first, second);
    }

    #[test]
    fn test_passing_case_gets_audit_steps() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir.path().join("regression.out"), "ok 1 + alpha 10 ms\n");
        write(
            &dir.path().join("results/alpha.out"),
            "SELECT 1;\n 1\n(1 row)\n",
        );
        write(
            &dir.path().join("expected/alpha.out"),
            "SELECT 1;\n 1\n(1 row)\n",
        );

        let layout = HarnessLayout::locate(
            dir.path(),
            Path::new("regression.diffs"),
            None,
            ExpectedMode::Pg,
        );
        let report = run_convert(&layout, &KeywordSegmenter).expect("convert");
        match &report.cases[0].outcome {
            CaseOutcome::Passed { steps } => {
                assert_eq!(steps.len(), 1);
                assert!(steps[0].sql.starts_with("SELECT 1;"));
                assert_eq!(steps[0].expected, steps[0].actual);
            }
            other => panic!("expected Passed outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_compare_pipeline_statuses() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            &dir.path().join("regression.out"),
            "not ok 1 + diffy 5 ms\nnot ok 2 + lost 5 ms\n",
        );
        write(&dir.path().join("expected/diffy.out"), "one\ntwo\n");
        write(&dir.path().join("results/diffy.out"), "one\nthree\n");
        // "lost" has neither expected nor actual file.

        let opts = CompareOptions {
            base_dir: dir.path().to_path_buf(),
            run_log: PathBuf::from("regression.out"),
            expected_dir: PathBuf::from("expected"),
            ora_expected_dir: PathBuf::from("ora_expected/expected"),
            results_dir: PathBuf::from("results"),
            tests: Vec::new(),
            context: 3,
            mode: ExpectedMode::Pg,
        };
        let report = run_compare(&opts).expect("compare");

        assert_eq!(report.tests(), 2);
        assert_eq!(report.failures(), 2);
        assert_eq!(report.results[0].status, CompareStatus::Diff);
        assert!(report.results[0].output.contains("+three"));
        assert_eq!(report.results[1].status, CompareStatus::MissingExpected);
    }

    #[test]
    fn test_compare_explicit_test_subset() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir.path().join("regression.out"), "not ok 1 + a 5 ms\n");
        write(&dir.path().join("expected/b.out"), "same\n");
        write(&dir.path().join("results/b.out"), "same\n");

        let opts = CompareOptions {
            base_dir: dir.path().to_path_buf(),
            run_log: PathBuf::from("regression.out"),
            expected_dir: PathBuf::from("expected"),
            ora_expected_dir: PathBuf::from("ora_expected/expected"),
            results_dir: PathBuf::from("results"),
            tests: vec!["b".to_string()],
            context: 3,
            mode: ExpectedMode::Pg,
        };
        let report = run_compare(&opts).expect("compare");
        assert_eq!(report.tests(), 1);
        assert_eq!(report.results[0].status, CompareStatus::Ok);
    }

    #[test]
    fn test_summary_artifact_counts() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            &dir.path().join("regression.out"),
            "ok 1 + alpha 10 ms\nnot ok 2 + beta 20 ms\n",
        );
        let layout = HarnessLayout::locate(
            dir.path(),
            Path::new("regression.diffs"),
            None,
            ExpectedMode::Pg,
        );
        let report = run_convert(&layout, &KeywordSegmenter).expect("convert");
        let artifact = report.summary_artifact(Utc::now());
        assert_eq!(artifact.tests, 2);
        assert_eq!(artifact.failures, 1);
        assert_eq!(artifact.cases[1].name, "beta");
    }
}
