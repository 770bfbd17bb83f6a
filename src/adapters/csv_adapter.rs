//! CSV file data adapter.
//!
//! One file per symbol (`<dir>/<SYMBOL>.csv`) with a
//! `date,open,high,low,close,volume` header row.

use crate::domain::error::FortunaError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, FortunaError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| FortunaError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| FortunaError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let field = |i: usize, name: &str| {
                record.get(i).ok_or_else(|| FortunaError::Data {
                    reason: format!("missing {name} column in {}", path.display()),
                })
            };

            let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d").map_err(|e| {
                FortunaError::Data {
                    reason: format!("invalid date in {}: {}", path.display(), e),
                }
            })?;

            let parse_f64 = |i: usize, name: &str| -> Result<f64, FortunaError> {
                field(i, name)?.parse().map_err(|e| FortunaError::Data {
                    reason: format!("invalid {name} value in {}: {}", path.display(), e),
                })
            };

            let open = parse_f64(1, "open")?;
            let high = parse_f64(2, "high")?;
            let low = parse_f64(3, "low")?;
            let close = parse_f64(4, "close")?;
            let volume: i64 = field(5, "volume")?.parse().map_err(|e| FortunaError::Data {
                reason: format!("invalid volume value in {}: {}", path.display(), e),
            })?;

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, FortunaError> {
        let bars = self.read_all(symbol)?;
        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, FortunaError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| FortunaError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FortunaError::Data {
                reason: format!("directory entry error: {e}"),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FortunaError> {
        let bars = self.read_all(symbol)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
