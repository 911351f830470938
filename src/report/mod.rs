pub mod types;

pub use types::{FileSummary, OutputFormat, Report};

use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::coverage::CoverageGap;
use crate::diff::{AddedLine, Diagnostic};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Build a Report from the walker's output and optional coverage gaps.
///
/// Files are grouped in order of first appearance; a file split across
/// several `diff --git` sections is reported once.
pub fn build(
    added_lines: Vec<AddedLine>,
    gaps: Option<Vec<CoverageGap>>,
    diagnostics: Vec<Diagnostic>,
    source: &str,
) -> Report {
    let mut files: Vec<FileSummary> = Vec::new();
    for line in &added_lines {
        match files.iter_mut().find(|f| f.path == line.file) {
            Some(summary) => summary.lines.push(line.clone()),
            None => files.push(FileSummary {
                path: line.file.clone(),
                lines: vec![line.clone()],
                gap_count: 0,
            }),
        }
    }

    for gap in gaps.iter().flatten() {
        if let Some(summary) = files.iter_mut().find(|f| f.path == gap.added.file) {
            summary.gap_count += 1;
        }
    }

    Report {
        source: source.to_string(),
        added_lines,
        files,
        gaps,
        diagnostics,
    }
}

/// Write the report.
///
/// - `Text` with no path prints a colored summary to stdout
/// - `Text` with a path writes markdown
/// - `Json` prints or writes the JSON rendering
#[instrument(skip(report), fields(source = %report.source, added = report.total_added()))]
pub fn output(
    report: &Report,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> Result<(), ReportError> {
    match (format, output_path) {
        (OutputFormat::Text, None) => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        (OutputFormat::Text, Some(path)) => {
            debug!(path = %path.display(), "writing markdown report to file");
            std::fs::write(path, render_markdown(report))?;
            Ok(())
        }
        (OutputFormat::Json, None) => {
            debug!("writing json to stdout");
            println!("{}", render_json(report)?);
            Ok(())
        }
        (OutputFormat::Json, Some(path)) => {
            debug!(path = %path.display(), "writing json report to file");
            std::fs::write(path, render_json(report)?)?;
            Ok(())
        }
    }
}

/// JSON rendering: the bare added-line array, or an object that also
/// carries the gaps when a coverage report was used.
pub fn render_json(report: &Report) -> Result<String, ReportError> {
    let json = match &report.gaps {
        None => serde_json::to_string_pretty(&report.added_lines)?,
        Some(gaps) => serde_json::to_string_pretty(&serde_json::json!({
            "added_lines": report.added_lines,
            "coverage_gaps": gaps,
        }))?,
    };
    Ok(json)
}

/// Format and print the report to the terminal with colors.
///
/// Diff: changes.patch
/// Files: 2 | +5 added | 1 coverage gap
///
/// ═══ src/lib.rs (+3) ═══
///     2 │ use std::io;
/// ...
fn print_terminal_report(report: &Report) {
    println!();
    println!("Diff: {}", report.source);
    println!("{}", summary_line(report));
    println!();

    for file in &report.files {
        println!("═══ {} (+{}) ═══", file.path.bold(), file.lines.len());
        for line in &file.lines {
            println!("  {:>5} │ {}", line.line.to_string().dimmed(), line.code);
        }
        println!();
    }

    if let Some(gaps) = &report.gaps {
        println!("═══ Coverage Gaps: {} ═══", colorize_count(gaps.len()));
        if gaps.is_empty() {
            println!("  Every added executable line is covered.");
        }
        for gap in gaps {
            println!(
                "  • {}:{} {} ({})",
                gap.added.file,
                gap.added.line,
                gap.added.code.trim(),
                gap.reason
            );
        }
        println!();
    }

    if !report.diagnostics.is_empty() {
        println!("═══ Skipped Input: {} ═══", report.diagnostics.len().to_string().yellow());
        for diagnostic in &report.diagnostics {
            println!("  • {}", diagnostic);
        }
        println!();
    }
}

/// Render the report as markdown.
///
/// # Diff: changes.patch
/// **Files:** 2 | **+5 added**
///
/// ## src/lib.rs (+3)
/// | Line | Code |
fn render_markdown(report: &Report) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Diff: {}\n\n", report.source));
    md.push_str(&format!(
        "**Files:** {} | **+{} added**",
        report.files.len(),
        report.total_added()
    ));
    if report.gaps.is_some() {
        md.push_str(&format!(" | **{} coverage gaps**", report.total_gaps()));
    }
    md.push_str("\n\n");

    for file in &report.files {
        md.push_str(&format!("## {} (+{})\n\n", file.path, file.lines.len()));
        md.push_str("| Line | Code |\n|---:|---|\n");
        for line in &file.lines {
            md.push_str(&format!("| {} | {} |\n", line.line, code_span(&line.code)));
        }
        md.push('\n');
    }

    if let Some(gaps) = &report.gaps {
        md.push_str(&format!("## Coverage Gaps ({})\n\n", gaps.len()));
        if gaps.is_empty() {
            md.push_str("Every added executable line is covered.\n\n");
        } else {
            for gap in gaps {
                md.push_str(&format!(
                    "- `{}:{}` {}\n",
                    gap.added.file, gap.added.line, gap.reason
                ));
            }
            md.push('\n');
        }
    }

    if !report.diagnostics.is_empty() {
        md.push_str(&format!("## Skipped Input ({})\n\n", report.diagnostics.len()));
        for diagnostic in &report.diagnostics {
            md.push_str(&format!("- {}\n", diagnostic));
        }
        md.push('\n');
    }

    md
}

fn summary_line(report: &Report) -> String {
    let mut line = format!(
        "Files: {} | {}",
        report.files.len(),
        format!("+{} added", report.total_added()).green()
    );
    if report.gaps.is_some() {
        line.push_str(&format!(" | {} coverage gaps", colorize_count(report.total_gaps())));
    }
    line
}

/// Wrap code in an inline code span for a table cell, keeping its text intact.
///
/// The fence is one backtick longer than the longest run inside the code.
/// Pipes are escaped since they would otherwise end the cell.
fn code_span(code: &str) -> String {
    let longest_run = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    let needs_padding = code.is_empty()
        || code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && code.trim() != "");
    let pad = if needs_padding { " " } else { "" };
    format!("{fence}{pad}{}{pad}{fence}", code.replace('|', "\\|"))
}

/// Red when there is anything to look at, green otherwise.
fn colorize_count(count: usize) -> colored::ColoredString {
    if count == 0 {
        count.to_string().green().bold()
    } else {
        count.to_string().red().bold()
    }
}
