//! Per-test outcome rows parsed from the harness run log.

use serde::{Deserialize, Serialize};

/// Pass/fail marker from the run log (`ok` / `not ok` lines).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TestStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "not ok")]
    NotOk,
}

impl TestStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, TestStatus::NotOk)
    }
}

/// One test case as it appeared in the run log.
///
/// Ordering within a run is appearance order in the log and is preserved
/// all the way into the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCaseResult {
    /// Test name, unique within a run.
    pub name: String,

    /// Enclosing parallel-group label, or the default group.
    pub group: String,

    /// Duration in seconds (the log records integer milliseconds).
    pub duration_secs: f64,

    /// Pass/fail status.
    pub status: TestStatus,
}
