pub mod types;

pub use types::{CoverageGap, GapReason, LineHits};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::diff::AddedLine;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("Failed to read coverage report: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse coverage report: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid line number {key:?} for {file} in coverage report")]
    InvalidLine { file: String, key: String },
}

/// Per-file hits as they may appear in a report: either keyed by line
/// number, or positional with index 0 holding line 1.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFileHits {
    Keyed(BTreeMap<String, Option<u64>>),
    Positional(Vec<Option<u64>>),
}

/// Line hit counts per file. A `None` count marks a non-executable line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    files: BTreeMap<String, BTreeMap<usize, Option<u64>>>,
}

impl CoverageReport {
    /// Load a JSON coverage report from disk.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<CoverageReport, CoverageError> {
        let contents = std::fs::read_to_string(path)?;
        let report = Self::from_json(&contents)?;
        debug!(files = report.files.len(), "loaded coverage report");
        Ok(report)
    }

    /// Parse a JSON object mapping file path to per-line hit counts.
    pub fn from_json(json: &str) -> Result<CoverageReport, CoverageError> {
        let raw: BTreeMap<String, RawFileHits> = serde_json::from_str(json)?;
        let mut files = BTreeMap::new();
        for (file, hits) in raw {
            let lines = match hits {
                RawFileHits::Positional(hits) => hits
                    .into_iter()
                    .enumerate()
                    .map(|(index, count)| (index + 1, count))
                    .collect(),
                RawFileHits::Keyed(hits) => {
                    let mut lines = BTreeMap::new();
                    for (key, count) in hits {
                        let line = key
                            .parse::<usize>()
                            .ok()
                            .filter(|line| *line > 0)
                            .ok_or_else(|| CoverageError::InvalidLine {
                                file: file.clone(),
                                key: key.clone(),
                            })?;
                        lines.insert(line, count);
                    }
                    lines
                }
            };
            files.insert(file, lines);
        }
        Ok(CoverageReport { files })
    }

    pub fn hits(&self, file: &str, line: usize) -> LineHits {
        let Some(lines) = self.files.get(file) else {
            return LineHits::FileMissing;
        };
        match lines.get(&line).copied().flatten() {
            None => LineHits::NotExecutable,
            Some(0) => LineHits::Uncovered,
            Some(count) => LineHits::Covered(count),
        }
    }
}

/// Added lines that are executable but never executed, in diff order.
///
/// Lines in files the report doesn't know about count as gaps only when
/// `missing_file_is_gap` is set.
pub fn find_gaps(
    lines: &[AddedLine],
    report: &CoverageReport,
    missing_file_is_gap: bool,
) -> Vec<CoverageGap> {
    let gaps: Vec<CoverageGap> = lines
        .iter()
        .filter_map(|added| {
            let reason = match report.hits(&added.file, added.line) {
                LineHits::Uncovered => GapReason::NeverExecuted,
                LineHits::FileMissing if missing_file_is_gap => GapReason::FileNotInReport,
                _ => return None,
            };
            Some(CoverageGap {
                added: added.clone(),
                reason,
            })
        })
        .collect();
    debug!(added = lines.len(), gaps = gaps.len(), "computed coverage gaps");
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "lib/app.ex": {"1": null, "2": 3, "3": 0, "4": 0},
        "lib/util.ex": [null, 1, 0]
    }"#;

    #[test]
    fn test_hits_keyed_report() {
        let report = CoverageReport::from_json(REPORT).unwrap();
        assert_eq!(report.hits("lib/app.ex", 1), LineHits::NotExecutable);
        assert_eq!(report.hits("lib/app.ex", 2), LineHits::Covered(3));
        assert_eq!(report.hits("lib/app.ex", 3), LineHits::Uncovered);
        assert_eq!(report.hits("lib/app.ex", 99), LineHits::NotExecutable);
        assert_eq!(report.hits("lib/other.ex", 1), LineHits::FileMissing);
    }

    #[test]
    fn test_hits_positional_report() {
        let report = CoverageReport::from_json(REPORT).unwrap();
        assert_eq!(report.hits("lib/util.ex", 1), LineHits::NotExecutable);
        assert_eq!(report.hits("lib/util.ex", 2), LineHits::Covered(1));
        assert_eq!(report.hits("lib/util.ex", 3), LineHits::Uncovered);
    }

    #[test]
    fn test_invalid_line_key() {
        let err = CoverageReport::from_json(r#"{"a.ex": {"zero": 1}}"#).unwrap_err();
        assert!(matches!(err, CoverageError::InvalidLine { .. }));
        let err = CoverageReport::from_json(r#"{"a.ex": {"0": 1}}"#).unwrap_err();
        assert!(matches!(err, CoverageError::InvalidLine { .. }));
    }

    #[test]
    fn test_not_json() {
        let err = CoverageReport::from_json("not json").unwrap_err();
        assert!(matches!(err, CoverageError::Parse(_)));
    }

    #[test]
    fn test_find_gaps_in_diff_order() {
        let report = CoverageReport::from_json(REPORT).unwrap();
        let lines = vec![
            AddedLine::new("lib/util.ex", 3, "raise \"boom\""),
            AddedLine::new("lib/app.ex", 2, "covered()"),
            AddedLine::new("lib/app.ex", 4, "uncovered()"),
            AddedLine::new("lib/app.ex", 1, "# comment"),
            AddedLine::new("lib/new.ex", 1, "defmodule New do"),
        ];
        let gaps = find_gaps(&lines, &report, false);
        let located: Vec<(&str, usize)> = gaps
            .iter()
            .map(|g| (g.added.file.as_str(), g.added.line))
            .collect();
        assert_eq!(located, vec![("lib/util.ex", 3), ("lib/app.ex", 4)]);
        assert!(gaps.iter().all(|g| g.reason == GapReason::NeverExecuted));
    }

    #[test]
    fn test_find_gaps_missing_file() {
        let report = CoverageReport::from_json(REPORT).unwrap();
        let lines = vec![AddedLine::new("lib/new.ex", 1, "defmodule New do")];
        assert!(find_gaps(&lines, &report, false).is_empty());
        let gaps = find_gaps(&lines, &report, true);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].reason, GapReason::FileNotInReport);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("diff_walker_coverage_test.json");
        std::fs::write(&path, REPORT).unwrap();
        let report = CoverageReport::load(&path).unwrap();
        assert_eq!(report.hits("lib/app.ex", 3), LineHits::Uncovered);
        std::fs::remove_file(&path).ok();
    }
}
