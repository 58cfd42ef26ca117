//! Fallback narrative for diffs that resist structural alignment.
//!
//! When no hunk could be mapped onto a statement, the raw diff text is
//! classified into runtime errors, value mismatches, a plan change, or a
//! generic failure note. The result is never empty for non-empty input.

/// Marker token for server runtime errors in diff text.
const ERROR_MARKER: &str = "ERROR:";

/// Marker token for EXPLAIN output, used to flag plan changes.
const PLAN_MARKER: &str = "QUERY PLAN";

const MAX_ERRORS: usize = 5;
const MAX_MISMATCHES: usize = 10;
const MISMATCH_SIDE_LIMIT: usize = 200;

/// Classify raw diff text into a human-readable summary.
///
/// Empty input produces an empty summary; callers handle the no-diff case
/// with their own note so a failing test always gets some narrative.
pub fn summarize_diff(diff_text: &str) -> String {
    if diff_text.is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = diff_text.lines().collect();

    // Errors are scanned over every line up front; the block walk below
    // consumes whole runs at a time and would skip lines inside them.
    let errors: Vec<String> = lines
        .iter()
        .filter(|line| line.contains(ERROR_MARKER))
        .map(|line| line.trim().to_string())
        .collect();

    let mut mismatches: Vec<(String, String)> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if is_expected_line(line) {
            let mut expected_block = Vec::new();
            while i < lines.len() && is_expected_line(lines[i]) {
                expected_block.push(&lines[i][1..]);
                i += 1;
            }
            let mut actual_block = Vec::new();
            while i < lines.len() && is_actual_line(lines[i]) {
                actual_block.push(&lines[i][1..]);
                i += 1;
            }

            let expected = expected_block.join("\n").trim().to_string();
            let actual = actual_block.join("\n").trim().to_string();
            // Paired table-separator rows are layout noise, not a mismatch.
            if expected.starts_with("--") && actual.starts_with("--") {
                continue;
            }
            if expected != actual {
                mismatches.push((expected, actual));
            }
            continue; // already advanced past both blocks
        }

        i += 1;
    }

    let mut summary: Vec<String> = Vec::new();

    if !errors.is_empty() {
        summary.push("[RUNTIME ERRORS]".to_string());
        for err in dedup_preserving_order(errors).into_iter().take(MAX_ERRORS) {
            summary.push(format!("  ! {err}"));
        }
        summary.push(String::new());
    }

    if !mismatches.is_empty() {
        summary.push("[VALUE MISMATCHES]".to_string());
        for (expected, actual) in mismatches.iter().take(MAX_MISMATCHES) {
            summary.push(format!("  - EXPECTED: {}", clip(expected)));
            summary.push(format!("  + ACTUAL:   {}", clip(actual)));
            summary.push(format!("  {}", "-".repeat(20)));
        }
        if mismatches.len() > MAX_MISMATCHES {
            summary.push(format!(
                "  ... and {} more mismatches.",
                mismatches.len() - MAX_MISMATCHES
            ));
        }
        summary.push(String::new());
    }

    if summary.is_empty() {
        if diff_text.contains(PLAN_MARKER) {
            summary.push("[PLAN CHANGE] Query execution plan has changed.".to_string());
        } else {
            summary.push("[GENERAL FAILURE] Output does not match expected result.".to_string());
        }
        summary.push(String::new());
    }

    summary.join("\n")
}

fn is_expected_line(line: &str) -> bool {
    line.starts_with('-') && !line.starts_with("---")
}

fn is_actual_line(line: &str) -> bool {
    line.starts_with('+') && !line.starts_with("+++")
}

fn clip(s: &str) -> String {
    if s.chars().count() > MISMATCH_SIDE_LIMIT {
        let clipped: String = s.chars().take(MISMATCH_SIDE_LIMIT).collect();
        format!("{clipped}...")
    } else {
        s.to_string()
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|s| seen.insert(s.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_errors_collected_and_deduped() {
        let diff = "+ERROR: relation \"t\" does not exist\n\
                    +ERROR: relation \"t\" does not exist\n\
                    +ERROR: division by zero\n";
        let summary = summarize_diff(diff);
        assert!(summary.contains("[RUNTIME ERRORS]"));
        assert_eq!(summary.matches("does not exist").count(), 1);
        assert!(summary.contains("division by zero"));
    }

    #[test]
    fn test_value_mismatch_blocks() {
        let diff = " context\n-old value\n+new value\n context\n";
        let summary = summarize_diff(diff);
        assert!(summary.contains("[VALUE MISMATCHES]"));
        assert!(summary.contains("EXPECTED: old value"));
        assert!(summary.contains("ACTUAL:   new value"));
    }

    #[test]
    fn test_file_header_lines_are_not_mismatches() {
        let diff = "--- expected/boolean.out\n+++ results/boolean.out\n";
        let summary = summarize_diff(diff);
        assert!(!summary.contains("[VALUE MISMATCHES]"));
        assert!(summary.contains("[GENERAL FAILURE]"));
    }

    #[test]
    fn test_error_inside_mismatch_block_still_reported() {
        let diff = "-expected row\n+ERROR: division by zero\n";
        let summary = summarize_diff(diff);
        assert!(summary.contains("[RUNTIME ERRORS]"));
        assert!(summary.contains("division by zero"));
    }

    #[test]
    fn test_plan_change_note() {
        let diff = " QUERY PLAN\n unchanged line\n";
        let summary = summarize_diff(diff);
        assert!(summary.contains("[PLAN CHANGE]"));
    }

    #[test]
    fn test_generic_failure_note() {
        let summary = summarize_diff(" only context lines here\n");
        assert!(summary.contains("[GENERAL FAILURE]"));
    }

    #[test]
    fn test_long_sides_clipped() {
        let long = "x".repeat(300);
        let diff = format!("-{long}\n+short\n");
        let summary = summarize_diff(&diff);
        assert!(summary.contains(&format!("{}...", "x".repeat(200))));
    }

    #[test]
    fn test_empty_input_is_empty() {
        assert!(summarize_diff("").is_empty());
    }

    #[test]
    fn test_mismatch_overflow_note() {
        let mut diff = String::new();
        for i in 0..12 {
            diff.push_str(&format!("-old{i}\n+new{i}\n x\n"));
        }
        let summary = summarize_diff(&diff);
        assert!(summary.contains("... and 2 more mismatches."));
    }
}
