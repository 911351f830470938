use serde::{Deserialize, Serialize};

/// A line added by the diff, addressed on the new side of the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedLine {
    /// Path from the `b/` side of the file header
    pub file: String,
    /// 1-based line number in the post-change file
    pub line: usize,
    /// Line content with only the leading `+` removed
    pub code: String,
}

impl AddedLine {
    pub fn new(file: impl Into<String>, line: usize, code: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            code: code.into(),
        }
    }
}

/// An anomaly the walker recovered from. `diff_line` is 1-based within the diff text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnresolvedFileHeader { diff_line: usize },
    HunkWithoutFile { diff_line: usize },
    MalformedHunkHeader { diff_line: usize, header: String },
    /// A line would land past the largest representable line number
    LineOutOfRange { diff_line: usize },
}

impl Diagnostic {
    pub fn diff_line(&self) -> usize {
        match self {
            Diagnostic::UnresolvedFileHeader { diff_line }
            | Diagnostic::HunkWithoutFile { diff_line }
            | Diagnostic::MalformedHunkHeader { diff_line, .. }
            | Diagnostic::LineOutOfRange { diff_line } => *diff_line,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnresolvedFileHeader { diff_line } => {
                write!(f, "line {}: could not resolve new path from file header", diff_line)
            }
            Diagnostic::HunkWithoutFile { diff_line } => {
                write!(f, "line {}: hunk header outside any file section", diff_line)
            }
            Diagnostic::MalformedHunkHeader { diff_line, header } => {
                write!(f, "line {}: malformed hunk header {:?}", diff_line, header)
            }
            Diagnostic::LineOutOfRange { diff_line } => {
                write!(f, "line {}: new-file line number out of range", diff_line)
            }
        }
    }
}

/// Everything a single walk over a diff produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Added lines in the order they appear in the diff
    pub lines: Vec<AddedLine>,
    /// Recovered anomalies, advisory only
    pub diagnostics: Vec<Diagnostic>,
}
