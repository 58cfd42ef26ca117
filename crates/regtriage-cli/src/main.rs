//! Regtriage - SQL regression report CLI
//!
//! The `regtriage` command turns pg_regress-style run artifacts into
//! JUnit-shaped XML reports.
//!
//! ## Commands
//!
//! - `convert`: Align recorded `regression.diffs` hunks to SQL statements
//! - `compare`: Recompute diffs for failing tests from expected/results files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, Level};

use regtriage_core::{
    init_tracing, run_compare, run_convert, timestamped_report_name, write_report,
    write_summary_json, CompareOptions, ExpectedMode, HarnessLayout, KeywordSegmenter,
};

#[derive(Parser)]
#[command(name = "regtriage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SQL regression test report generator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Use expected/ first, falling back to ora_expected/ per file
    Pg,
    /// Use ora_expected/ first (with expected_<test>.out naming), then expected/
    Oracle,
}

impl From<ModeArg> for ExpectedMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Pg => ExpectedMode::Pg,
            ModeArg::Oracle => ExpectedMode::Oracle,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a statement-aligned XML report from a recorded run
    Convert {
        /// Run log file, or the directory containing regression.out
        regression_out: PathBuf,

        /// Concatenated unified-diffs file, relative to the run directory
        #[arg(default_value = "regression.diffs")]
        regression_diffs: PathBuf,

        /// Override the base directory for results/, expected/ and sql/
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Expected-directory convention
        #[arg(long, value_enum, default_value_t = ModeArg::Oracle)]
        mode: ModeArg,

        /// Report path (default: regression_report_<timestamp>.xml in cwd)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a machine-readable run summary to this path
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },

    /// Recompute diffs for failing tests and report them whole
    Compare {
        /// Run directory
        #[arg(long, default_value = ".")]
        base_dir: PathBuf,

        /// Run log path, relative to the base directory
        #[arg(long, default_value = "regression.out")]
        regression: PathBuf,

        /// Expected outputs directory
        #[arg(long, default_value = "expected")]
        expected_dir: PathBuf,

        /// Oracle-compatibility expected outputs directory
        #[arg(long, default_value = "ora_expected/expected")]
        ora_expected_dir: PathBuf,

        /// Actual outputs directory
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,

        /// Compare only these tests instead of every failing test
        #[arg(long)]
        tests: Vec<String>,

        /// Unified-diff context lines
        #[arg(short = 'U', long, default_value_t = 3)]
        context: usize,

        /// Expected-directory convention
        #[arg(long, value_enum, default_value_t = ModeArg::Oracle)]
        mode: ModeArg,

        /// Report path (default: regression_report_<timestamp>.xml in cwd)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Convert {
            regression_out,
            regression_diffs,
            base_dir,
            mode,
            output,
            summary_json,
        } => cmd_convert(
            &regression_out,
            &regression_diffs,
            base_dir.as_deref(),
            mode.into(),
            output,
            summary_json,
        ),
        Commands::Compare {
            base_dir,
            regression,
            expected_dir,
            ora_expected_dir,
            results_dir,
            tests,
            context,
            mode,
            output,
        } => cmd_compare(
            CompareOptions {
                base_dir,
                run_log: regression,
                expected_dir,
                ora_expected_dir,
                results_dir,
                tests,
                context,
                mode: mode.into(),
            },
            output,
        ),
    }
}

fn cmd_convert(
    regression_out: &std::path::Path,
    regression_diffs: &std::path::Path,
    base_dir: Option<&std::path::Path>,
    mode: ExpectedMode,
    output: Option<PathBuf>,
    summary_json: Option<PathBuf>,
) -> Result<()> {
    let layout = HarnessLayout::locate(regression_out, regression_diffs, base_dir, mode);
    let report = run_convert(&layout, &KeywordSegmenter)
        .with_context(|| format!("Failed to convert run at {}", layout.run_log.display()))?;

    let output =
        output.unwrap_or_else(|| PathBuf::from(timestamped_report_name(chrono::Local::now())));
    write_report(&output, &report.render_xml())
        .with_context(|| format!("Failed to write report to {}", output.display()))?;
    info!(path = %output.display(), "wrote regression report");

    if let Some(summary_path) = summary_json {
        let artifact = report.summary_artifact(chrono::Utc::now());
        write_summary_json(&summary_path, &artifact)
            .with_context(|| format!("Failed to write summary to {}", summary_path.display()))?;
        info!(path = %summary_path.display(), "wrote run summary");
    }

    println!(
        "Report written to {} ({} tests, {} failures)",
        output.display(),
        report.tests(),
        report.failures()
    );
    Ok(())
}

fn cmd_compare(opts: CompareOptions, output: Option<PathBuf>) -> Result<()> {
    let report = run_compare(&opts)
        .with_context(|| format!("Failed to compare run at {}", opts.base_dir.display()))?;

    let output =
        output.unwrap_or_else(|| PathBuf::from(timestamped_report_name(chrono::Local::now())));
    write_report(&output, &report.render_xml())
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    println!(
        "Report written to {} ({} tests, {} failures)",
        output.display(),
        report.tests(),
        report.failures()
    );
    Ok(())
}
