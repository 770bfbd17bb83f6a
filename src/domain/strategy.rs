//! Rebalance-gated execution state machine.
//!
//! Converts the per-day signal stream into discrete position-change
//! decisions. Transitions are only permitted on rebalance days determined
//! by the configured cadence; the machine is long-only and idempotent
//! (no re-buying an open position, no re-closing a flat one).

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Rebalancing cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebalance {
    Daily,
    Weekly,
    Monthly,
}

impl Rebalance {
    /// Whether `date` opens a new period relative to the previously
    /// simulated day. The first call (`prev` is `None`) always rebalances.
    ///
    /// Only the immediately preceding simulated day is compared; a gap of
    /// skipped days spanning a period boundary triggers exactly once, on
    /// the first bar after the gap.
    pub fn is_rebalance_day(&self, date: NaiveDate, prev: Option<NaiveDate>) -> bool {
        let Some(prev) = prev else {
            return true;
        };
        match self {
            Rebalance::Daily => true,
            Rebalance::Weekly => date.iso_week() != prev.iso_week(),
            Rebalance::Monthly => (date.year(), date.month()) != (prev.year(), prev.month()),
        }
    }
}

impl fmt::Display for Rebalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rebalance::Daily => "daily",
            Rebalance::Weekly => "weekly",
            Rebalance::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown rebalance cadence: {0} (expected daily, weekly or monthly)")]
pub struct ParseRebalanceError(String);

impl FromStr for Rebalance {
    type Err = ParseRebalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Rebalance::Daily),
            "weekly" => Ok(Rebalance::Weekly),
            "monthly" => Ok(Rebalance::Monthly),
            other => Err(ParseRebalanceError(other.to_string())),
        }
    }
}

/// Position-change decision handed to the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    OpenLong,
    CloseLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Long,
}

/// The per-day decision machine. `on_bar` must be called exactly once per
/// simulated trading day, in increasing date order.
#[derive(Debug, Clone)]
pub struct SignalStrategy {
    rebalance: Rebalance,
    state: PositionState,
    prev_date: Option<NaiveDate>,
}

impl SignalStrategy {
    pub fn new(rebalance: Rebalance) -> Self {
        Self {
            rebalance,
            state: PositionState::Flat,
            prev_date: None,
        }
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    /// Decide at the close of `date` given that day's signal. Any signal
    /// value other than 1 is treated as neutral; shorts are never opened.
    ///
    /// `prev_date` advances on every call so the period marker keeps
    /// tracking the calendar even on non-rebalance days.
    pub fn on_bar(&mut self, date: NaiveDate, signal: u8) -> Action {
        let rebalance_day = self.rebalance.is_rebalance_day(date, self.prev_date);
        self.prev_date = Some(date);

        if !rebalance_day {
            return Action::None;
        }

        match (signal, self.state) {
            (1, PositionState::Flat) => {
                self.state = PositionState::Long;
                Action::OpenLong
            }
            (1, PositionState::Long) => Action::None,
            (_, PositionState::Long) => {
                self.state = PositionState::Flat;
                Action::CloseLong
            }
            (_, PositionState::Flat) => Action::None,
        }
    }
}
