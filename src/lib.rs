//! Maps the added lines of a unified diff to their file path and line number
//! on the new side of the change, and checks them against a coverage report.

pub mod config;
pub mod coverage;
pub mod diff;
pub mod report;

#[cfg(test)]
mod tests {
    use crate::coverage::{self, CoverageReport, GapReason};
    use crate::diff::{self, AddedLine};

    const SAMPLE_DIFF: &str = include_str!("../tests/fixtures/sample_diff.patch");
    const SAMPLE_COVERAGE: &str = include_str!("../tests/fixtures/sample_coverage.json");

    fn located(lines: &[AddedLine], file: &str) -> Vec<usize> {
        lines.iter().filter(|l| l.file == file).map(|l| l.line).collect()
    }

    #[test]
    fn test_sample_fixture_line_numbers() {
        let outcome = diff::walk(SAMPLE_DIFF);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.lines.len(), 17);
        assert_eq!(
            located(&outcome.lines, "lib/billing/invoice.ex"),
            vec![14, 18, 19, 45, 46, 47]
        );
        assert_eq!(
            located(&outcome.lines, "lib/billing/reminder.ex"),
            vec![1, 2, 3, 4, 5, 6, 7]
        );
        assert_eq!(
            located(&outcome.lines, "test/billing/invoice_test.exs"),
            vec![31, 32, 33, 34]
        );
        assert_eq!(outcome.lines[0].code, "    |> Enum.map(&line_amount/1)");
        assert_eq!(outcome.lines[2].code, "");
    }

    #[test]
    fn test_sample_fixture_coverage_gaps() {
        let lines = diff::parse(SAMPLE_DIFF);
        let report = CoverageReport::from_json(SAMPLE_COVERAGE).unwrap();
        let gaps = coverage::find_gaps(&lines, &report, false);
        let at: Vec<(&str, usize)> = gaps
            .iter()
            .map(|g| (g.added.file.as_str(), g.added.line))
            .collect();
        assert_eq!(
            at,
            vec![
                ("lib/billing/invoice.ex", 18),
                ("lib/billing/invoice.ex", 46),
                ("lib/billing/reminder.ex", 5),
            ]
        );

        let strict = coverage::find_gaps(&lines, &report, true);
        let missing = strict
            .iter()
            .filter(|g| g.reason == GapReason::FileNotInReport)
            .count();
        assert_eq!(missing, 4);
    }
}
