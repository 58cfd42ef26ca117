//! Splits a concatenated `regression.diffs` file into per-test diff blobs.
//!
//! The harness appends each failing test's unified diff to one file, with a
//! `diff -U3 .../expected/<name>.out .../results/<name>.out` header between
//! blocks. Tests that passed simply have no block — absence is not an error.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

// The stem must match in the expected-like and results path segments. The
// regex crate has no backreferences, so both stems are captured and compared
// in code.
static BLOCK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^diff -U\d+ .*?/(?:expected|ora_expected)/(.+?)\.out .*?/results/(.+?)\.out")
        .expect("diff header regex")
});

/// Split diff text into a map from test name to that test's raw diff blob.
///
/// The header line itself is part of the blob; every following line belongs
/// to the current test until the next header. Lines before the first header
/// are dropped.
pub fn split_diff_blocks(text: &str) -> BTreeMap<String, String> {
    let mut blocks = BTreeMap::new();
    let mut current_test: Option<String> = None;
    let mut current_content = String::new();

    for line in text.lines() {
        let header = BLOCK_HEADER
            .captures(line)
            .filter(|caps| caps[1] == caps[2]);
        if let Some(caps) = header {
            if let Some(test) = current_test.take() {
                blocks.insert(test, std::mem::take(&mut current_content));
            }
            current_test = Some(caps[1].to_string());
            current_content.push_str(line);
            current_content.push('\n');
        } else if current_test.is_some() {
            current_content.push_str(line);
            current_content.push('\n');
        }
    }

    if let Some(test) = current_test {
        blocks.insert(test, current_content);
    }

    blocks
}
