//! Validated price series and trailing-window access.
//!
//! `PriceSeries::new` is the single chokepoint for structural validation:
//! bars must be strictly increasing by date with well-formed fields, or the
//! whole run aborts before any forecasting begins.

use chrono::NaiveDate;

use super::error::FortunaError;
use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone)]
pub struct PriceSeries {
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    /// Validate and take ownership of a chronologically sorted bar sequence.
    ///
    /// An empty series is allowed; duplicate or out-of-order dates and
    /// malformed price fields are fatal.
    pub fn new(bars: Vec<OhlcvBar>) -> Result<Self, FortunaError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_well_formed() {
                return Err(FortunaError::MalformedSeries {
                    reason: format!("bar at {} has invalid price or volume fields", bar.date),
                });
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(FortunaError::MalformedSeries {
                    reason: format!(
                        "dates not strictly increasing: {} followed by {}",
                        bars[i - 1].date,
                        bar.date
                    ),
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Index of the first bar on or after `date` (next trading day if `date`
    /// itself is not a bar), or `None` when `date` falls past the last bar.
    pub fn index_at_or_after(&self, date: NaiveDate) -> Option<usize> {
        let i = self.bars.partition_point(|b| b.date < date);
        (i < self.bars.len()).then_some(i)
    }

    /// Trailing window of exactly `lookback` bars ending at and including
    /// index `i`. `None` when `i < lookback` (the walk-forward skip rule) or
    /// `i` is out of bounds.
    pub fn window_ending(&self, i: usize, lookback: usize) -> Option<&[OhlcvBar]> {
        if lookback == 0 || i < lookback || i >= self.bars.len() {
            return None;
        }
        Some(&self.bars[i - lookback + 1..=i])
    }
}
