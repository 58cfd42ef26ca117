//! Assembles the report document from parsed and aligned test data.
//!
//! The shape follows the JUnit conventions most report viewers understand:
//! `<testsuites>` / `<testsuite>` / `<testcase>`, with `<failure>` children
//! for failing tests. On top of that, nested `<steps>` records expose the
//! per-statement expected/actual pairs for machine consumption, and the
//! first pair is duplicated at the parent level for viewers that only look
//! for a single top-level `<expected>`/`<actual>`.

use crate::align::FileComparison;
use crate::domain::{MismatchEntry, TestCaseResult};
use crate::report::xml::XmlElement;

/// Narrative cap: at most this many STEP blocks are rendered in the
/// human-readable failure text. The structured `<steps>` list is uncapped.
const NARRATIVE_STEP_CAP: usize = 10;

/// Per-side character cap in the `<system-err>` steps block.
const STEPS_TEXT_SIDE_CAP: usize = 8000;

/// One fully-processed test ready for report emission.
#[derive(Debug, Clone)]
pub struct TestCaseReport {
    pub case: TestCaseResult,
    /// Raw actual-output text, or a note that the file was missing.
    pub actual_output: String,
    pub outcome: CaseOutcome,
}

/// Outcome payload per test.
#[derive(Debug, Clone)]
pub enum CaseOutcome {
    /// Best-effort audit pairs for a passing test.
    Passed { steps: Vec<MismatchEntry> },
    /// Failure narrative plus the ordered mismatch entries.
    Failed {
        narrative: String,
        entries: Vec<MismatchEntry>,
    },
}

/// Render the human-readable failure text for aligned mismatches.
pub fn aligned_narrative(test_name: &str, entries: &[MismatchEntry]) -> String {
    let mut lines = vec![format!("[FAIL] {test_name}\n")];
    for (idx, entry) in entries.iter().take(NARRATIVE_STEP_CAP).enumerate() {
        // STEP header and SQL stay on separate lines; some viewers collapse
        // whitespace when they share one.
        lines.push(format!("STEP {}:", idx + 1));
        lines.push(entry.sql.clone());
        lines.push(format!("EXPECTED:\n{}", entry.expected));
        lines.push(format!("ACTUAL:\n{}", entry.actual));
        lines.push("-".repeat(40));
    }
    if entries.len() > NARRATIVE_STEP_CAP {
        lines.push(format!(
            "... and {} more mismatching steps.",
            entries.len() - NARRATIVE_STEP_CAP
        ));
    }
    lines.join("\n")
}

/// Render the fallback failure text when no alignment was possible.
pub fn fallback_narrative(test_name: &str, diff_summary: &str) -> String {
    let body = if diff_summary.is_empty() {
        "[NO DIFF RECORDED] Output compared as a whole; see attached expected/actual."
    } else {
        diff_summary
    };
    format!("[FAIL] {test_name}\n\n{body}")
}

fn truncate_side(s: &str, limit: usize) -> String {
    let count = s.chars().count();
    if count <= limit {
        return s.to_string();
    }
    let kept: String = s.chars().take(limit).collect();
    format!("{kept}\n...[truncated {} chars]...", count - limit)
}

/// Render the `[STEPS]` block attached to `<system-err>`.
pub fn steps_block_text(steps: &[MismatchEntry]) -> String {
    if steps.is_empty() {
        return String::new();
    }

    let mut lines = vec![String::new(), "[STEPS]".to_string()];
    for (idx, step) in steps.iter().take(NARRATIVE_STEP_CAP).enumerate() {
        lines.push(format!("STEP {}:", idx + 1));
        lines.push(if step.sql.is_empty() {
            "(no sql)".to_string()
        } else {
            step.sql.clone()
        });
        lines.push("EXPECTED:".to_string());
        lines.push(truncate_side(&step.expected, STEPS_TEXT_SIDE_CAP));
        lines.push("ACTUAL:".to_string());
        lines.push(truncate_side(&step.actual, STEPS_TEXT_SIDE_CAP));
        lines.push("-".repeat(40));
    }
    if steps.len() > NARRATIVE_STEP_CAP {
        lines.push(format!(
            "... and {} more steps (not shown)",
            steps.len() - NARRATIVE_STEP_CAP
        ));
        lines.push("-".repeat(40));
    }
    lines.push(String::new());
    lines.join("\n")
}

fn steps_element(entries: &[MismatchEntry]) -> XmlElement {
    let mut steps = XmlElement::new("steps");
    for (idx, entry) in entries.iter().enumerate() {
        steps.push_child(
            XmlElement::new("step")
                .attr("index", (idx + 1).to_string())
                .child(XmlElement::new("sql").text(entry.sql.clone()))
                .child(XmlElement::new("expected").text(entry.expected.clone()))
                .child(XmlElement::new("actual").text(entry.actual.clone())),
        );
    }
    steps
}

fn testcase_element(report: &TestCaseReport) -> XmlElement {
    let case = &report.case;
    let mut testcase = XmlElement::new("testcase")
        .attr("name", case.name.clone())
        .attr("classname", case.group.clone())
        .attr("time", case.duration_secs.to_string());

    testcase.push_child(XmlElement::new("system-out").text(report.actual_output.clone()));

    match &report.outcome {
        CaseOutcome::Failed { narrative, entries } => {
            testcase.push_child(XmlElement::new("system-err").text(steps_block_text(entries)));

            let mut failure = XmlElement::new("failure")
                .attr("message", "Test failed")
                .attr("type", "Failure")
                .text(narrative.clone());
            failure.push_child(steps_element(entries));
            if let Some(first) = entries.first() {
                failure.push_child(XmlElement::new("expected").text(first.expected.clone()));
                failure.push_child(XmlElement::new("actual").text(first.actual.clone()));
            }
            testcase.push_child(failure);
        }
        CaseOutcome::Passed { steps } => {
            testcase.push_child(XmlElement::new("system-err").text(steps_block_text(steps)));

            if !steps.is_empty() {
                testcase.push_child(steps_element(steps));
                let first = &steps[0];
                testcase.push_child(XmlElement::new("expected").text(first.expected.clone()));
                testcase.push_child(XmlElement::new("actual").text(first.actual.clone()));
            }
        }
    }

    testcase
}

/// Build the full report tree for the recorded-diff pipeline.
///
/// Root invariant: the `failures` attribute equals the number of `NotOk`
/// cases and `tests` the total count, whatever the per-test fallbacks did.
pub fn build_report(reports: &[TestCaseReport], suite_name: &str) -> XmlElement {
    let failures = reports
        .iter()
        .filter(|r| r.case.status.is_failure())
        .count();

    let mut testsuite = XmlElement::new("testsuite")
        .attr("name", suite_name)
        .attr("tests", reports.len().to_string())
        .attr("failures", failures.to_string())
        .attr("errors", "0")
        .attr("skipped", "0");

    for report in reports {
        testsuite.push_child(testcase_element(report));
    }

    XmlElement::new("testsuites").child(testsuite)
}

/// Build the report tree for the self-computed-diff pipeline.
///
/// Coarser than the aligned report: one node per compared test with
/// file-level expected/actual text and the freshly computed diff in
/// `<system-out>`.
pub fn build_compare_report(results: &[FileComparison], suite_name: &str) -> XmlElement {
    let failures = results.iter().filter(|r| r.status.is_failure()).count();

    let mut testsuite = XmlElement::new("testsuite")
        .attr("name", suite_name)
        .attr("tests", results.len().to_string())
        .attr("failures", failures.to_string())
        .attr("errors", "0")
        .attr("skipped", "0");

    for result in results {
        let mut testcase = XmlElement::new("testcase").attr("name", result.test.clone());
        if result.status.is_failure() {
            testcase.push_child(
                XmlElement::new("failure")
                    .attr("message", "Test failed")
                    .attr("type", "Failure")
                    .text(if result.message.is_empty() {
                        "diff found".to_string()
                    } else {
                        result.message.clone()
                    }),
            );
        }
        testcase.push_child(XmlElement::new("expected").text(result.expected_text.clone()));
        testcase.push_child(XmlElement::new("actual").text(result.actual_text.clone()));
        testcase.push_child(XmlElement::new("system-out").text(result.output.clone()));
        testsuite.push_child(testcase);
    }

    XmlElement::new("testsuites").child(testsuite)
}
