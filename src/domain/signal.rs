//! Walk-forward signal generation.
//!
//! For every eligible day the generator slices the trailing `lookback`-bar
//! window, asks the oracle for a point forecast `pred_len` days out, and
//! converts the implied forward return into a binary trade signal. A day's
//! record is computed from bars dated at or before that day only.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::series::PriceSeries;
use crate::ports::oracle_port::OraclePort;

/// Per-day forecast outcome. `signal` is 1 (bullish) or 0 (neutral/bearish).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRecord {
    pub predicted_return: f64,
    pub signal: u8,
}

impl SignalRecord {
    pub const NEUTRAL: SignalRecord = SignalRecord {
        predicted_return: 0.0,
        signal: 0,
    };
}

impl Default for SignalRecord {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Time-indexed signal mapping over the full series date domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSeries {
    records: BTreeMap<NaiveDate, SignalRecord>,
}

impl SignalSeries {
    pub fn insert(&mut self, date: NaiveDate, record: SignalRecord) {
        self.records.insert(date, record);
    }

    /// Record for `date`, neutral when absent. Never fails.
    pub fn at(&self, date: NaiveDate) -> SignalRecord {
        self.records.get(&date).copied().unwrap_or_default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&SignalRecord> {
        self.records.get(&date)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &SignalRecord)> {
        self.records.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalParams {
    pub start_date: NaiveDate,
    pub lookback: usize,
    pub pred_len: usize,
    pub threshold: f64,
}

/// Outcome of one generation pass. `evaluated == 0` means no eligible day
/// was found (start date past the end of history, or too little data).
#[derive(Debug)]
pub struct SignalRun {
    pub signals: SignalSeries,
    pub evaluated: usize,
    pub oracle_failures: usize,
}

/// Progress observation emitted once per evaluated day. Informational only.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub date: NaiveDate,
    pub step: usize,
    pub total_steps: usize,
    pub predicted_return: f64,
    pub signal: u8,
}

/// Walk forward through `series` from `params.start_date` and produce a
/// signal record for every eligible day.
///
/// Days before the start, days with fewer than `lookback` prior bars, and
/// days whose forecast fails all carry the neutral default; a single oracle
/// failure never aborts the remaining days.
pub fn generate_signals(
    series: &PriceSeries,
    oracle: &dyn OraclePort,
    params: &SignalParams,
) -> SignalRun {
    generate_signals_with_progress(series, oracle, params, &mut |_| {})
}

pub fn generate_signals_with_progress(
    series: &PriceSeries,
    oracle: &dyn OraclePort,
    params: &SignalParams,
    progress: &mut dyn FnMut(Progress),
) -> SignalRun {
    let mut signals = SignalSeries::default();
    for bar in series.bars() {
        signals.insert(bar.date, SignalRecord::NEUTRAL);
    }

    let Some(start_idx) = series.index_at_or_after(params.start_date) else {
        // Start date outside available history: recoverable, all-neutral.
        return SignalRun {
            signals,
            evaluated: 0,
            oracle_failures: 0,
        };
    };

    let total_steps = series.len() - start_idx;
    let mut evaluated = 0usize;
    let mut oracle_failures = 0usize;

    for i in start_idx..series.len() {
        let Some(window) = series.window_ending(i, params.lookback) else {
            continue;
        };

        let bar = &series.bars()[i];
        let last_close = bar.close;

        let predicted_return = match oracle.forecast(window, params.pred_len) {
            Ok(forecast_close) => (forecast_close - last_close) / last_close,
            Err(_) => {
                // Local recovery: this day stays neutral, the run continues.
                oracle_failures += 1;
                0.0
            }
        };
        evaluated += 1;

        let signal = u8::from(predicted_return > params.threshold);
        signals.insert(
            bar.date,
            SignalRecord {
                predicted_return,
                signal,
            },
        );

        progress(Progress {
            date: bar.date,
            step: i - start_idx + 1,
            total_steps,
            predicted_return,
            signal,
        });
    }

    SignalRun {
        signals,
        evaluated,
        oracle_failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::ports::oracle_port::OracleError;
    use proptest::prelude::*;
    use std::cell::RefCell;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_series(len: usize, start_close: f64) -> PriceSeries {
        let bars: Vec<OhlcvBar> = (0..len)
            .map(|i| {
                let close = start_close + i as f64;
                OhlcvBar {
                    symbol: "AAPL".to_string(),
                    date: date(2024, 1, 1) + chrono::Days::new(i as u64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000,
                }
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    /// Predicts a fixed multiple of the window's last close.
    #[derive(Debug)]
    struct ConstOracle {
        factor: f64,
        calls: RefCell<usize>,
    }

    impl ConstOracle {
        fn new(factor: f64) -> Self {
            Self {
                factor,
                calls: RefCell::new(0),
            }
        }
    }

    impl OraclePort for ConstOracle {
        fn forecast(&self, window: &[OhlcvBar], _horizon: usize) -> Result<f64, OracleError> {
            *self.calls.borrow_mut() += 1;
            let last = window.last().expect("window is never empty");
            Ok(last.close * self.factor)
        }
    }

    /// Fails on selected window-end dates, otherwise predicts +10%.
    #[derive(Debug)]
    struct FlakyOracle {
        fail_on: Vec<NaiveDate>,
    }

    impl OraclePort for FlakyOracle {
        fn forecast(&self, window: &[OhlcvBar], _horizon: usize) -> Result<f64, OracleError> {
            let last = window.last().expect("window is never empty");
            if self.fail_on.contains(&last.date) {
                return Err(OracleError::new("sampler diverged"));
            }
            Ok(last.close * 1.10)
        }
    }

    fn params(start: NaiveDate, lookback: usize) -> SignalParams {
        SignalParams {
            start_date: start,
            lookback,
            pred_len: 5,
            threshold: 0.0,
        }
    }

    #[test]
    fn neutral_before_lookback() {
        let series = make_series(10, 100.0);
        let oracle = ConstOracle::new(1.05);
        let run = generate_signals(&series, &oracle, &params(date(2024, 1, 1), 4));

        // Indices 0..=3 (i < lookback) stay neutral.
        for i in 0..4 {
            let d = series.bars()[i].date;
            assert_eq!(run.signals.at(d), SignalRecord::NEUTRAL, "index {i}");
        }
        for i in 4..10 {
            let d = series.bars()[i].date;
            assert_eq!(run.signals.at(d).signal, 1, "index {i}");
        }
        assert_eq!(run.evaluated, 6);
        assert_eq!(run.oracle_failures, 0);
    }

    #[test]
    fn bullish_signal_above_threshold() {
        let series = make_series(6, 100.0);
        let oracle = ConstOracle::new(1.05);
        let run = generate_signals(&series, &oracle, &params(date(2024, 1, 1), 2));

        let last = series.last_date().unwrap();
        let record = run.signals.at(last);
        assert_eq!(record.signal, 1);
        assert!((record.predicted_return - 0.05).abs() < 1e-12);
    }

    #[test]
    fn bearish_forecast_yields_zero_signal() {
        let series = make_series(6, 100.0);
        let oracle = ConstOracle::new(0.97);
        let run = generate_signals(&series, &oracle, &params(date(2024, 1, 1), 2));

        let last = series.last_date().unwrap();
        let record = run.signals.at(last);
        assert_eq!(record.signal, 0);
        assert!(record.predicted_return < 0.0);
    }

    #[test]
    fn threshold_is_strict() {
        let series = make_series(4, 100.0);
        let oracle = ConstOracle::new(1.0); // predicted return exactly 0.0
        let run = generate_signals(&series, &oracle, &params(date(2024, 1, 1), 2));

        let last = series.last_date().unwrap();
        assert_eq!(run.signals.at(last).signal, 0);
    }

    #[test]
    fn start_past_last_bar_never_invokes_oracle() {
        let series = make_series(5, 100.0);
        let oracle = ConstOracle::new(1.05);
        let run = generate_signals(&series, &oracle, &params(date(2024, 2, 1), 2));

        assert_eq!(run.evaluated, 0);
        assert_eq!(*oracle.calls.borrow(), 0);
        assert_eq!(run.signals.len(), 5);
        for (_, record) in run.signals.iter() {
            assert_eq!(*record, SignalRecord::NEUTRAL);
        }
    }

    #[test]
    fn start_between_bars_backfills_to_next_trading_day() {
        let series = make_series(10, 100.0);
        let oracle = ConstOracle::new(1.05);
        // Start mid-series; earlier days keep the neutral default.
        let run = generate_signals(&series, &oracle, &params(date(2024, 1, 6), 3));

        assert_eq!(run.signals.at(date(2024, 1, 5)), SignalRecord::NEUTRAL);
        assert_eq!(run.signals.at(date(2024, 1, 6)).signal, 1);
    }

    #[test]
    fn oracle_failure_neutralizes_single_day_only() {
        let series = make_series(8, 100.0);
        let oracle = FlakyOracle {
            fail_on: vec![date(2024, 1, 5)],
        };
        let run = generate_signals(&series, &oracle, &params(date(2024, 1, 1), 2));

        assert_eq!(run.oracle_failures, 1);
        let failed = run.signals.at(date(2024, 1, 5));
        assert_eq!(failed, SignalRecord::NEUTRAL);
        // Neighbours are unaffected.
        assert_eq!(run.signals.at(date(2024, 1, 4)).signal, 1);
        assert_eq!(run.signals.at(date(2024, 1, 6)).signal, 1);
    }

    #[test]
    fn deterministic_oracle_is_idempotent() {
        let series = make_series(12, 100.0);
        let oracle = ConstOracle::new(1.02);
        let p = params(date(2024, 1, 1), 4);

        let first = generate_signals(&series, &oracle, &p);
        let second = generate_signals(&series, &oracle, &p);
        assert_eq!(first.signals, second.signals);
        assert_eq!(first.evaluated, second.evaluated);
    }

    #[test]
    fn missing_date_defaults_neutral() {
        let signals = SignalSeries::default();
        assert_eq!(signals.at(date(2024, 6, 1)), SignalRecord::NEUTRAL);
    }

    #[test]
    fn progress_reports_every_evaluated_day() {
        let series = make_series(10, 100.0);
        let oracle = ConstOracle::new(1.05);
        let mut seen = Vec::new();
        generate_signals_with_progress(
            &series,
            &oracle,
            &params(date(2024, 1, 1), 4),
            &mut |p| seen.push(p.date),
        );

        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], date(2024, 1, 5));
        assert_eq!(*seen.last().unwrap(), date(2024, 1, 10));
    }

    proptest! {
        /// Every window handed to the oracle has exactly `lookback` bars and
        /// never reaches past the decision day.
        #[test]
        fn window_invariants(len in 1usize..60, lookback in 1usize..20) {
            #[derive(Debug)]
            struct CheckingOracle {
                lookback: usize,
            }

            impl OraclePort for CheckingOracle {
                fn forecast(&self, window: &[OhlcvBar], _horizon: usize) -> Result<f64, OracleError> {
                    assert_eq!(window.len(), self.lookback);
                    for pair in window.windows(2) {
                        assert!(pair[0].date < pair[1].date);
                    }
                    Ok(window.last().unwrap().close)
                }
            }

            let series = make_series(len, 100.0);
            let oracle = CheckingOracle { lookback };
            let run = generate_signals(&series, &oracle, &SignalParams {
                start_date: date(2024, 1, 1),
                lookback,
                pred_len: 3,
                threshold: 0.0,
            });

            // Days strictly before the lookback horizon are neutral.
            for (i, bar) in series.bars().iter().enumerate() {
                if i < lookback {
                    prop_assert_eq!(run.signals.at(bar.date), SignalRecord::NEUTRAL);
                }
            }
            let expected = len.saturating_sub(lookback);
            prop_assert_eq!(run.evaluated, expected);
        }
    }
}
