use serde::Serialize;

use crate::diff::AddedLine;

/// Coverage state of a single new-file line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineHits {
    /// Executed this many times (at least once)
    Covered(u64),
    /// Executable but never executed
    Uncovered,
    /// No entry, or an explicit `null` (comments, blank lines, declarations)
    NotExecutable,
    /// The report has no data for the file at all
    FileMissing,
}

/// Why an added line counts as a coverage gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapReason {
    NeverExecuted,
    FileNotInReport,
}

impl std::fmt::Display for GapReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GapReason::NeverExecuted => write!(f, "never executed"),
            GapReason::FileNotInReport => write!(f, "file not in coverage report"),
        }
    }
}

/// An added line that no test exercises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageGap {
    #[serde(flatten)]
    pub added: AddedLine,
    pub reason: GapReason,
}
