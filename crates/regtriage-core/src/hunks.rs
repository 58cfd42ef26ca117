//! Unified-diff hunk parsing for one test's diff blob.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Hunk, HunkLine};

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("hunk header regex")
});

fn capture_len(caps: &regex::Captures<'_>, idx: usize) -> usize {
    // Unified diff convention: a missing length means 1.
    caps.get(idx)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Parse the hunks of a raw diff blob, in appearance order.
///
/// Lines before the first `@@` header are ignored (this is where the
/// `diff -U` command line and `---`/`+++` file headers usually live).
/// `---`/`+++` lines are dropped outright even when they show up mid-hunk;
/// they are file headers, never content.
pub fn parse_hunks(diff_text: &str) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;

    for line in diff_text.lines() {
        if let Some(caps) = HUNK_HEADER.captures(line) {
            if let Some(done) = current.take() {
                hunks.push(done);
            }
            // Starts always match `\d+`; treat an overflowing number as a
            // malformed header, which ends hunk accumulation.
            let starts = (caps[1].parse::<usize>(), caps[3].parse::<usize>());
            if let (Ok(expected_start), Ok(actual_start)) = starts {
                current = Some(Hunk {
                    expected_start,
                    expected_len: capture_len(&caps, 2),
                    actual_start,
                    actual_len: capture_len(&caps, 4),
                    lines: Vec::new(),
                });
            }
            continue;
        }

        let Some(hunk) = current.as_mut() else {
            continue;
        };

        if line.starts_with("---") || line.starts_with("+++") {
            continue;
        }
        if let Some(rest) = line.strip_prefix('-') {
            hunk.lines.push(HunkLine::ExpectedOnly(rest.to_string()));
        } else if let Some(rest) = line.strip_prefix('+') {
            hunk.lines.push(HunkLine::ActualOnly(rest.to_string()));
        } else if let Some(rest) = line.strip_prefix(' ') {
            hunk.lines.push(HunkLine::Context(rest.to_string()));
        } else {
            // e.g. "\ No newline at end of file"
            hunk.lines.push(HunkLine::Context(line.to_string()));
        }
    }

    if let Some(done) = current {
        hunks.push(done);
    }

    hunks
}
