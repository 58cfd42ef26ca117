//! Run-log parser for the harness pass/fail listing.
//!
//! The run log is a sequential text file: `# parallel group (...)` headers
//! open a group context, and `ok`/`not ok` rows record one test each.
//! Anything else (banners, totals, blank lines) is ignored by design —
//! harness logs are not byte-stable across versions, so unknown lines are
//! skipped rather than rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{TestCaseResult, TestStatus};

/// Group label used before any group header has been seen.
pub const DEFAULT_GROUP: &str = "Default Group";

static TEST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(ok|not ok)\s+(\d+)\s+([-+])\s+(\S+)\s+(\d+)\s+ms").expect("test line regex")
});

static PARALLEL_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"# (parallel group \(.*?\))").expect("group regex"));

/// Parse run-log text into an ordered list of test case results.
///
/// The "current group" is an explicit accumulator carried through the scan:
/// a `#`-leading line replaces it, and every subsequent test row is tagged
/// with it until the next header. Malformed rows are silently skipped.
pub fn parse_run_log(text: &str) -> Vec<TestCaseResult> {
    let mut cases = Vec::new();
    let mut current_group = DEFAULT_GROUP.to_string();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            current_group = match PARALLEL_GROUP.captures(line) {
                Some(caps) => caps[1].to_string(),
                None => rest.split(':').next().unwrap_or("").trim().to_string(),
            };
            continue;
        }

        if let Some(caps) = TEST_LINE.captures(line) {
            let status = if &caps[1] == "ok" {
                TestStatus::Ok
            } else {
                TestStatus::NotOk
            };
            // The pattern guarantees digits; overflow on absurd inputs just
            // skips the row like any other malformed line.
            let Ok(millis) = caps[5].parse::<u64>() else {
                continue;
            };
            cases.push(TestCaseResult {
                name: caps[4].to_string(),
                group: current_group.clone(),
                duration_secs: millis as f64 / 1000.0,
                status,
            });
        }
    }

    cases
}

/// Names of the failing tests, in log order.
pub fn failing_tests(cases: &[TestCaseResult]) -> Vec<String> {
    cases
        .iter()
        .filter(|c| c.status.is_failure())
        .map(|c| c.name.clone())
        .collect()
}
