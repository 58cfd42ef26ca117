//! End-to-end coverage for the recorded-diff pipeline: run log + diffs +
//! output files in, sanitized XML report out.

use std::fs;
use std::path::Path;

use regtriage_core::{
    run_convert, ExpectedMode, HarnessLayout, KeywordSegmenter, RegtriageError,
};

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write fixture");
}

fn layout_for(dir: &Path) -> HarnessLayout {
    HarnessLayout::locate(
        dir,
        Path::new("regression.diffs"),
        None,
        ExpectedMode::Pg,
    )
}

#[test]
fn test_run_without_diffs_reports_full_output_fallback() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir.path().join("regression.out"),
        "ok 1 + alpha 12 ms\nnot ok 2 + beta 34 ms\n",
    );
    write(&dir.path().join("results/alpha.out"), "SELECT 1;\n 1\n");
    write(&dir.path().join("results/beta.out"), "SELECT 2;\n 3\n");
    write(&dir.path().join("expected/beta.out"), "SELECT 2;\n 2\n");

    let report = run_convert(&layout_for(dir.path()), &KeywordSegmenter).expect("convert");
    let doc = report.render_xml();

    assert!(doc.contains("tests=\"2\""));
    assert!(doc.contains("failures=\"1\""));
    assert!(doc.contains("name=\"alpha\""));
    assert!(doc.contains("name=\"beta\""));
    // no recorded diff for beta: whole-file comparison, not aligned steps
    assert!(doc.contains("<sql>(full output)</sql>"));
    assert!(doc.contains("[NO DIFF RECORDED]"));
    // duration 34 ms lands as seconds
    assert!(doc.contains("time=\"0.034\""));
}

#[test]
fn test_recorded_hunk_aligns_to_containing_statement() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(&dir.path().join("regression.out"), "not ok 1 + gamma 8 ms\n");
    // Statement "SELECT 1;" starts on line 3; its result block runs to line 8.
    write(
        &dir.path().join("results/gamma.out"),
        "test banner\nmore banner\nSELECT 1;\n x\n---\nnew value\n(1 row)\n \n",
    );
    write(
        &dir.path().join("expected/gamma.out"),
        "test banner\nmore banner\nSELECT 1;\n x\n---\nold value\n(1 row)\n \n",
    );
    write(
        &dir.path().join("regression.diffs"),
        concat!(
            "diff -U3 /run/expected/gamma.out /run/results/gamma.out\n",
            "--- /run/expected/gamma.out\n",
            "+++ /run/results/gamma.out\n",
            "@@ -5,2 +5,2 @@\n",
            "-old value\n",
            "+new value\n",
        ),
    );

    let report = run_convert(&layout_for(dir.path()), &KeywordSegmenter).expect("convert");
    let doc = report.render_xml();

    assert!(doc.contains("failures=\"1\""));
    assert!(doc.contains("<sql>SELECT 1;</sql>"));
    assert!(doc.contains("<expected>old value</expected>"));
    assert!(doc.contains("<actual>new value</actual>"));
    // narrative carries the same pairing
    assert!(doc.contains("STEP 1:"));
    assert!(doc.contains("[FAIL] gamma"));
}

#[test]
fn test_missing_actual_file_noted_in_system_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(&dir.path().join("regression.out"), "not ok 1 + lost 3 ms\n");

    let report = run_convert(&layout_for(dir.path()), &KeywordSegmenter).expect("convert");
    let doc = report.render_xml();

    assert!(doc.contains("Actual output file not found at"));
    assert!(doc.contains("lost.out"));
}

#[test]
fn test_report_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir.path().join("regression.out"),
        "ok 1 + alpha 12 ms\nnot ok 2 + beta 34 ms\nnot ok 3 + gamma 5 ms\n",
    );
    write(&dir.path().join("results/alpha.out"), "SELECT 1;\n 1\n");
    write(&dir.path().join("expected/alpha.out"), "SELECT 1;\n 1\n");
    write(&dir.path().join("results/beta.out"), "SELECT 2;\n 3\n");

    let layout = layout_for(dir.path());
    let first = run_convert(&layout, &KeywordSegmenter).expect("convert").render_xml();
    let second = run_convert(&layout, &KeywordSegmenter).expect("convert").render_xml();
    assert_eq!(first, second);
}

#[test]
fn test_control_characters_are_sanitized_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(&dir.path().join("regression.out"), "not ok 1 + noisy 3 ms\n");
    write(
        &dir.path().join("results/noisy.out"),
        "SELECT 'x';\nbad\u{0}byte and \u{000e}shift\n",
    );

    let report = run_convert(&layout_for(dir.path()), &KeywordSegmenter).expect("convert");
    let doc = report.render_xml();

    assert!(!doc.contains('\u{0}'));
    assert!(!doc.contains('\u{000e}'));
    assert!(doc.contains("badbyte and shift"));
}

#[test]
fn test_group_names_flow_into_classname() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir.path().join("regression.out"),
        concat!(
            "# parallel group (2 tests): int2 int4\n",
            "ok 1 + int2 10 ms\n",
            "not ok 2 + int4 11 ms\n",
        ),
    );

    let report = run_convert(&layout_for(dir.path()), &KeywordSegmenter).expect("convert");
    let doc = report.render_xml();

    assert!(doc.contains("classname=\"parallel group (2 tests)\""));
}

#[test]
fn test_missing_run_log_is_the_only_fatal_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = run_convert(&layout_for(dir.path()), &KeywordSegmenter)
        .expect_err("missing run log must fail");
    assert!(matches!(err, RegtriageError::RunLogMissing(_)));
}

#[test]
fn test_summary_artifact_round_trips_through_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir.path().join("regression.out"),
        "ok 1 + alpha 12 ms\nnot ok 2 + beta 34 ms\n",
    );

    let report = run_convert(&layout_for(dir.path()), &KeywordSegmenter).expect("convert");
    let artifact = report.summary_artifact(chrono::Utc::now());

    let path = dir.path().join("summary.json");
    regtriage_core::write_summary_json(&path, &artifact).expect("write summary");
    let text = fs::read_to_string(&path).expect("read summary");
    let parsed: regtriage_core::RunSummaryArtifact =
        serde_json::from_str(&text).expect("parse summary");

    assert_eq!(parsed, artifact);
    assert_eq!(parsed.tests, 2);
    assert_eq!(parsed.failures, 1);
    assert_eq!(parsed.cases[1].name, "beta");
}
