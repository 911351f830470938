use clap::Parser;
use diff_walker::report::OutputFormat;
use diff_walker::{config, coverage, diff, report};
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

/// diff-walker: maps every added line of a unified diff to its file and
/// new-file line number, optionally flagging added lines no test executes.
#[derive(Parser, Debug)]
#[command(name = "diff-walker", version, about)]
struct Cli {
    /// Unified diff to read (e.g. output of `git diff -U0 main`), or `-` for stdin
    ///
    /// Not required when --mock is used.
    diff: Option<String>,

    /// JSON coverage report mapping file -> per-line hit counts
    #[arg(long)]
    coverage: Option<PathBuf>,

    /// Emit JSON records instead of the human-readable report
    #[arg(long)]
    json: bool,

    /// Optional output file path (markdown, or JSON with --json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use the bundled sample diff for demo purposes
    #[arg(long)]
    r#mock: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;

    let (source_name, raw) = if cli.r#mock {
        info!("using bundled sample diff");
        let sample = include_str!("../tests/fixtures/sample_diff.patch");
        ("sample_diff.patch".to_string(), sample.as_bytes().to_vec())
    } else {
        let arg = cli.diff.as_deref().ok_or(
            "A diff path is required unless --mock is used. Usage: diff-walker <DIFF|-> or diff-walker --mock",
        )?;
        let source = diff::DiffSource::from_arg(arg);
        info!(source = %source, "reading diff");
        (source.to_string(), source.read()?)
    };

    let _main_span = info_span!("diff_walk", source = %source_name).entered();

    info!("walking diff");
    let outcome = diff::walk_bytes(&raw)?;
    info!(
        added = outcome.lines.len(),
        skipped = outcome.diagnostics.len(),
        "walk complete"
    );

    let gaps = match cli.coverage.clone().or_else(|| config.coverage_report()) {
        Some(path) => {
            info!(path = %path.display(), "loading coverage report");
            let coverage_report = coverage::CoverageReport::load(&path)?;
            let gaps = coverage::find_gaps(
                &outcome.lines,
                &coverage_report,
                config.coverage.missing_file_is_gap,
            );
            Some(gaps)
        }
        None => {
            debug!("no coverage report configured");
            None
        }
    };

    let format = if cli.json || config.output.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    info!("generating report");
    let built_report = report::build(outcome.lines, gaps, outcome.diagnostics, &source_name);
    report::output(&built_report, format, cli.output.as_deref())?;
    info!(
        files = built_report.files.len(),
        gaps = built_report.total_gaps(),
        "done"
    );

    Ok(())
}
