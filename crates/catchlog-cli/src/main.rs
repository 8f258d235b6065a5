//! Command-line driver: runs the pipeline against a project root and
//! writes the result tables.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catchlog_core::{
    analyze_project, write_catch_summaries, write_log_records, AnalysisOptions, AnalysisReport,
    ScanConfig,
};

#[derive(Parser)]
#[command(
    name = "catchlog",
    version,
    about = "Mines exception-logging practice from Java sources"
)]
struct Cli {
    /// Project root to analyze
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Directory for the output tables
    #[arg(long, short, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Keep files following the *Test.java naming convention
    #[arg(long)]
    include_tests: bool,

    /// Extra exclude globs, relative to the root
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Worker threads; defaults to the number of cores
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,

    /// Log warnings and errors only
    #[arg(long, short, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Two delimited tables, exception_logs.csv and catch_sections.csv
    Csv,
    /// One report.json with records, summaries, and stats
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut scan = ScanConfig::new(&cli.root);
    scan.include_tests = cli.include_tests;
    scan.exclude = cli.exclude.clone();
    let options = AnalysisOptions {
        scan,
        threads: cli.threads,
    };

    let report = analyze_project(&options)
        .with_context(|| format!("analysis of `{}` failed", cli.root.display()))?;

    fs::create_dir_all(&cli.out)
        .with_context(|| format!("cannot create output directory `{}`", cli.out.display()))?;
    match cli.format {
        Format::Csv => write_csv(&cli.out, &report)?,
        Format::Json => write_json(&cli.out, &report)?,
    }

    let stats = &report.stats;
    println!(
        "{} files analyzed, {} catch sections, {} logging calls ({} ms)",
        stats.files_parsed, stats.catch_sections, stats.log_calls, stats.duration_ms
    );
    Ok(())
}

fn write_csv(out: &Path, report: &AnalysisReport) -> Result<()> {
    let logs = out.join("exception_logs.csv");
    let mut writer = BufWriter::new(
        File::create(&logs).with_context(|| format!("cannot create `{}`", logs.display()))?,
    );
    write_log_records(&mut writer, &report.log_records)?;
    writer.flush()?;

    let catches = out.join("catch_sections.csv");
    let mut writer = BufWriter::new(
        File::create(&catches).with_context(|| format!("cannot create `{}`", catches.display()))?,
    );
    write_catch_summaries(&mut writer, &report.catch_summaries)?;
    writer.flush()?;

    info!(logs = %logs.display(), catches = %catches.display(), "tables written");
    Ok(())
}

fn write_json(out: &Path, report: &AnalysisReport) -> Result<()> {
    let path = out.join("report.json");
    let mut writer = BufWriter::new(
        File::create(&path).with_context(|| format!("cannot create `{}`", path.display()))?,
    );
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    info!(path = %path.display(), "report written");
    Ok(())
}

/// Reads `CATCHLOG_LOG` for per-subsystem levels, falling back to a
/// level chosen by the verbosity flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let fallback = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_env("CATCHLOG_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
