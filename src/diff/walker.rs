use tracing::{debug, warn};

use super::types::{AddedLine, Diagnostic, ParseOutcome};

/// What a single diff line means to the walker, decided by prefix alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    /// `diff --git ...`, carrying everything after the marker
    FileHeader(&'a str),
    /// `index `, `--- a/`, `+++ b/`
    Metadata,
    /// `@@ -...`, carrying everything after the marker
    HunkHeader(&'a str),
    /// `+...`, carrying the content after the `+`
    Added(&'a str),
    Context,
    Removed,
    Other,
}

fn classify(line: &str) -> LineKind<'_> {
    if let Some(rest) = line.strip_prefix("diff --git ") {
        return LineKind::FileHeader(rest);
    }
    if line.starts_with("index ") || line.starts_with("--- a/") || line.starts_with("+++ b/") {
        return LineKind::Metadata;
    }
    if let Some(rest) = line.strip_prefix("@@ -") {
        return LineKind::HunkHeader(rest);
    }
    if let Some(code) = line.strip_prefix('+') {
        return LineKind::Added(code);
    }
    if line.starts_with(' ') {
        return LineKind::Context;
    }
    if line.starts_with('-') {
        return LineKind::Removed;
    }
    LineKind::Other
}

/// Position inside the hunk being walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HunkCursor {
    /// Declared new-file start line from the hunk header
    start: usize,
    /// New-file lines (context + added) seen so far in this hunk
    consumed: usize,
}

impl HunkCursor {
    fn new(start: usize) -> Self {
        Self { start, consumed: 0 }
    }

    /// New-file line of the next context or added line, `None` past `usize::MAX`.
    fn position(&self) -> Option<usize> {
        self.start.checked_add(self.consumed)
    }

    fn advance(&mut self) {
        self.consumed = self.consumed.saturating_add(1);
    }
}

/// Per-call walker state. `hunk` is `None` whenever the walker is not inside a hunk.
#[derive(Debug, Default)]
struct ParseState {
    current_file: Option<String>,
    hunk: Option<HunkCursor>,
    lines: Vec<AddedLine>,
    diagnostics: Vec<Diagnostic>,
}

impl ParseState {
    fn step(&mut self, diff_line: usize, line: &str) {
        match classify(line) {
            LineKind::FileHeader(rest) => {
                // A new file section always leaves any previous hunk.
                self.hunk = None;
                self.current_file = parse_new_path(rest);
                match &self.current_file {
                    Some(path) => debug!(diff_line, path = %path, "entered file section"),
                    None => record(
                        &mut self.diagnostics,
                        Diagnostic::UnresolvedFileHeader { diff_line },
                    ),
                }
            }
            LineKind::Metadata | LineKind::Other => {}
            LineKind::HunkHeader(rest) => {
                if self.current_file.is_none() {
                    record(&mut self.diagnostics, Diagnostic::HunkWithoutFile { diff_line });
                    return;
                }
                match parse_new_start(rest) {
                    Some(start) => self.hunk = Some(HunkCursor::new(start)),
                    None => record(
                        &mut self.diagnostics,
                        Diagnostic::MalformedHunkHeader {
                            diff_line,
                            header: line.to_string(),
                        },
                    ),
                }
            }
            // A hunk is only ever entered with a resolved file.
            LineKind::Added(code) => {
                let (Some(hunk), Some(file)) = (self.hunk.as_mut(), &self.current_file) else {
                    return;
                };
                match hunk.position() {
                    Some(position) => {
                        self.lines.push(AddedLine::new(file.as_str(), position, code));
                        hunk.advance();
                    }
                    None => {
                        record(&mut self.diagnostics, Diagnostic::LineOutOfRange { diff_line });
                        self.hunk = None;
                    }
                }
            }
            LineKind::Context => {
                if let Some(hunk) = self.hunk.as_mut() {
                    hunk.advance();
                }
            }
            // Removed lines occupy no position in the new file.
            LineKind::Removed => {}
        }
    }

    fn finish(self) -> ParseOutcome {
        ParseOutcome {
            lines: self.lines,
            diagnostics: self.diagnostics,
        }
    }
}

fn record(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!(diff_line = diagnostic.diff_line(), "{}", diagnostic);
    diagnostics.push(diagnostic);
}

/// Extract the new-side path from the text following `diff --git `.
///
/// Accepts `a/<old> b/<new>` optionally followed by a tab and metadata. When
/// old and new are identical the split is taken at the midpoint, so paths
/// that themselves contain ` b/` still resolve; renames fall back to the
/// first ` b/` separator.
fn parse_new_path(header: &str) -> Option<String> {
    let header = header.split_once('\t').map_or(header, |(paths, _)| paths);
    let rest = header.strip_prefix("a/")?;
    let new_path = symmetric_new_path(rest)
        .or_else(|| rest.split_once(" b/").map(|(_, new_path)| new_path))?;
    if new_path.is_empty() {
        return None;
    }
    Some(new_path.to_string())
}

fn symmetric_new_path(rest: &str) -> Option<&str> {
    let paths_len = rest.len().checked_sub(" b/".len())?;
    if paths_len % 2 != 0 {
        return None;
    }
    let half = paths_len / 2;
    let old_path = rest.get(..half)?;
    let new_path = rest.get(half..)?.strip_prefix(" b/")?;
    (old_path == new_path).then_some(new_path)
}

/// Extract the new-file start line from the text following `@@ -`.
///
/// The new range is `+start` or `+start,count`; only `start` matters here.
fn parse_new_start(header: &str) -> Option<usize> {
    let (_, new_range) = header.split_once('+')?;
    let start = new_range.split(|c| c == ',' || c == ' ').next()?;
    if start.is_empty() || !start.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    start.parse().ok()
}

/// Walk a unified diff once, collecting added lines and recovered anomalies.
pub fn walk(diff_text: &str) -> ParseOutcome {
    let mut state = ParseState::default();
    for (index, line) in diff_text.lines().enumerate() {
        state.step(index + 1, line);
    }
    let outcome = state.finish();
    debug!(
        added = outcome.lines.len(),
        diagnostics = outcome.diagnostics.len(),
        "walked diff"
    );
    outcome
}

/// Map every added line of a unified diff to its new-file path and line number.
///
/// Malformed sections are skipped, never fatal; see [`walk`] for the
/// diagnostics describing what was skipped.
pub fn parse(diff_text: &str) -> Vec<AddedLine> {
    walk(diff_text).lines
}
