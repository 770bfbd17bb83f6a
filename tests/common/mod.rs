#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use fortuna::domain::backtest::BacktestConfig;
use fortuna::domain::error::FortunaError;
use fortuna::domain::execution::ExecutionConfig;
pub use fortuna::domain::ohlcv::OhlcvBar;
use fortuna::domain::series::PriceSeries;
use fortuna::domain::strategy::Rebalance;
use fortuna::ports::data_port::DataPort;
use fortuna::ports::oracle_port::{OracleError, OraclePort};
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, FortunaError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(FortunaError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, FortunaError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FortunaError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(FortunaError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

/// Oracle that forecasts a fixed fractional move off the window's last close.
#[derive(Debug)]
pub struct ConstOracle {
    pub pct_move: f64,
    pub calls: Cell<usize>,
}

impl ConstOracle {
    pub fn new(pct_move: f64) -> Self {
        Self {
            pct_move,
            calls: Cell::new(0),
        }
    }
}

impl OraclePort for ConstOracle {
    fn forecast(&self, window: &[OhlcvBar], _horizon: usize) -> Result<f64, OracleError> {
        self.calls.set(self.calls.get() + 1);
        let last = window
            .last()
            .ok_or_else(|| OracleError::new("empty window"))?;
        Ok(last.close * (1.0 + self.pct_move))
    }
}

/// Oracle that fails on every call.
#[derive(Debug)]
pub struct FailingOracle;

impl OraclePort for FailingOracle {
    fn forecast(&self, _window: &[OhlcvBar], _horizon: usize) -> Result<f64, OracleError> {
        Err(OracleError::new("model unavailable"))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Consecutive calendar-day bars with a fixed daily price step.
pub fn generate_bars(symbol: &str, start_date: &str, count: usize, start_price: f64) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + i as f64 * 0.5;
            OhlcvBar {
                symbol: symbol.to_string(),
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

pub fn make_series(bars: Vec<OhlcvBar>) -> PriceSeries {
    PriceSeries::new(bars).unwrap()
}

pub fn sample_config(symbol: &str, start_date: NaiveDate) -> BacktestConfig {
    BacktestConfig {
        symbol: symbol.to_string(),
        start_date,
        initial_capital: 100_000.0,
        rebalance: Rebalance::Daily,
        execution: ExecutionConfig {
            position_size: 0.95,
            commission_per_trade: 0.0,
            commission_pct: 0.0,
            slippage_pct: 0.0,
        },
    }
}
