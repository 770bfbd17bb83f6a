//! CSV comparison report adapter.
//!
//! Writes the predicted-vs-actual rows as
//! `date,predicted_return,actual_return,signal`; days without a realized
//! forward return carry an empty actual_return field.

use crate::domain::error::FortunaError;
use crate::domain::metrics::ComparisonRow;
use crate::ports::report_port::ReportPort;
use std::path::Path;

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_comparison(&self, path: &Path, rows: &[ComparisonRow]) -> Result<(), FortunaError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| FortunaError::Data {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;

        wtr.write_record(["date", "predicted_return", "actual_return", "signal"])
            .map_err(|e| FortunaError::Data {
                reason: format!("CSV write error: {e}"),
            })?;

        for row in rows {
            let actual = row
                .actual_return
                .map(|a| a.to_string())
                .unwrap_or_default();
            wtr.write_record([
                row.date.format("%Y-%m-%d").to_string(),
                row.predicted_return.to_string(),
                actual,
                row.signal.to_string(),
            ])
            .map_err(|e| FortunaError::Data {
                reason: format!("CSV write error: {e}"),
            })?;
        }

        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("comparison.csv");

        let rows = vec![
            ComparisonRow {
                date: date(2024, 1, 15),
                predicted_return: 0.05,
                actual_return: Some(0.032),
                signal: 1,
            },
            ComparisonRow {
                date: date(2024, 1, 16),
                predicted_return: -0.01,
                actual_return: None,
                signal: 0,
            },
        ];

        CsvReportAdapter::new().write_comparison(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "date,predicted_return,actual_return,signal");
        assert_eq!(lines[1], "2024-01-15,0.05,0.032,1");
        // Unrealized actual return stays empty.
        assert_eq!(lines[2], "2024-01-16,-0.01,,0");
    }

    #[test]
    fn empty_rows_still_write_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("comparison.csv");

        CsvReportAdapter::new().write_comparison(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "date,predicted_return,actual_return,signal");
    }

    #[test]
    fn unwritable_path_errors() {
        let result = CsvReportAdapter::new()
            .write_comparison(Path::new("/nonexistent/dir/out.csv"), &[]);
        assert!(result.is_err());
    }
}
