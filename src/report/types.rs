use crate::coverage::CoverageGap;
use crate::diff::{AddedLine, Diagnostic};

/// Added lines of one file, in diff order.
#[derive(Debug, Clone)]
pub struct FileSummary {
    /// New-side path
    pub path: String,
    /// Added lines belonging to this file
    pub lines: Vec<AddedLine>,
    /// How many of those lines are coverage gaps
    pub gap_count: usize,
}

/// Output flavor selected on the command line or in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Colored terminal summary, or markdown when writing to a file
    #[default]
    Text,
    Json,
}

/// Complete report for one diff.
#[derive(Debug)]
pub struct Report {
    /// Where the diff came from (file path or `<stdin>`)
    pub source: String,
    /// All added lines in diff order
    pub added_lines: Vec<AddedLine>,
    /// Per-file grouping, in order of first appearance
    pub files: Vec<FileSummary>,
    /// Coverage gaps, `None` when no coverage report was used
    pub gaps: Option<Vec<CoverageGap>>,
    /// Anomalies the walker skipped over
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn total_added(&self) -> usize {
        self.added_lines.len()
    }

    pub fn total_gaps(&self) -> usize {
        self.gaps.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::GapReason;

    #[test]
    fn test_totals() {
        let line = AddedLine::new("a.rs", 1, "x");
        let report = Report {
            source: "<stdin>".to_string(),
            added_lines: vec![line.clone()],
            files: vec![],
            gaps: Some(vec![CoverageGap {
                added: line,
                reason: GapReason::NeverExecuted,
            }]),
            diagnostics: vec![],
        };
        assert_eq!(report.total_added(), 1);
        assert_eq!(report.total_gaps(), 1);
    }

    #[test]
    fn test_default_format_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
