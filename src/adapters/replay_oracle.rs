//! Fixture-replay oracle.
//!
//! Serves forecasts recorded by an external model from a
//! `date,forecast_close` CSV, keyed by the window's end date. Days absent
//! from the fixture fail per-call, which the generator contains locally.

use crate::domain::error::FortunaError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::oracle_port::{OracleError, OraclePort};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub struct ReplayOracle {
    forecasts: HashMap<NaiveDate, f64>,
}

impl ReplayOracle {
    pub fn from_file(path: &Path) -> Result<Self, FortunaError> {
        let content = fs::read_to_string(path).map_err(|e| FortunaError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_csv(&content).map_err(|reason| FortunaError::Data {
            reason: format!("{}: {}", path.display(), reason),
        })
    }

    pub fn from_csv(content: &str) -> Result<Self, String> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut forecasts = HashMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| format!("CSV parse error: {e}"))?;
            let date_str = record.get(0).ok_or("missing date column")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| format!("invalid date {date_str}: {e}"))?;
            let forecast: f64 = record
                .get(1)
                .ok_or("missing forecast_close column")?
                .parse()
                .map_err(|e| format!("invalid forecast value: {e}"))?;
            forecasts.insert(date, forecast);
        }

        Ok(Self { forecasts })
    }

    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }
}

impl OraclePort for ReplayOracle {
    fn forecast(&self, window: &[OhlcvBar], _horizon: usize) -> Result<f64, OracleError> {
        let last = window
            .last()
            .ok_or_else(|| OracleError::new("empty window"))?;
        self.forecasts
            .get(&last.date)
            .copied()
            .ok_or_else(|| OracleError::new(format!("no recorded forecast for {}", last.date)))
    }
}
