//! Daily bar simulator driving the rebalance strategy.
//!
//! A decision made at the close of day `t` fills at the open of day `t+1`.
//! Each simulated bar therefore first executes the pending action at that
//! bar's open, then consults the strategy at the close, then records
//! end-of-day equity. Any position still open after the last bar is
//! liquidated at the final close so every trade is a completed round trip.

use chrono::NaiveDate;

use super::execution::{self, EntryResult, ExecutionConfig};
use super::portfolio::Portfolio;
use super::series::PriceSeries;
use super::signal::SignalSeries;
use super::strategy::{Action, Rebalance, SignalStrategy};

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub initial_capital: f64,
    pub rebalance: Rebalance,
    pub execution: ExecutionConfig,
}

#[derive(Debug)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub bars_simulated: usize,
    /// Entry fills rejected at the open, e.g. for insufficient capital.
    pub entries_skipped: usize,
}

/// Run the simulator over all bars dated at or after `config.start_date`,
/// consuming the pre-generated signal mapping.
///
/// A missing signal for a day is treated as neutral; the strategy is
/// consulted exactly once per bar, in date order.
pub fn run_backtest(
    series: &PriceSeries,
    signals: &SignalSeries,
    config: &BacktestConfig,
) -> BacktestResult {
    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut strategy = SignalStrategy::new(config.rebalance);
    let mut pending = Action::None;
    let mut bars_simulated = 0usize;
    let mut entries_skipped = 0usize;

    let Some(start_idx) = series.index_at_or_after(config.start_date) else {
        return BacktestResult {
            portfolio,
            bars_simulated,
            entries_skipped,
        };
    };

    for bar in &series.bars()[start_idx..] {
        // Fill yesterday's decision at today's open.
        match pending {
            Action::OpenLong => {
                let entry = execution::enter_long(
                    &mut portfolio,
                    &config.symbol,
                    bar.open,
                    bar.date,
                    &config.execution,
                );
                if !matches!(entry, EntryResult::Entered { .. }) {
                    entries_skipped += 1;
                }
            }
            Action::CloseLong => {
                execution::exit_long(&mut portfolio, bar.open, bar.date, &config.execution);
            }
            Action::None => {}
        }

        pending = strategy.on_bar(bar.date, signals.at(bar.date).signal);
        portfolio.record_equity(bar.date, portfolio.total_equity(bar.close));
        bars_simulated += 1;
    }

    // Finalize: liquidate any open position at the last close.
    if portfolio.is_long() {
        if let Some(last) = series.bars().last() {
            execution::exit_long(&mut portfolio, last.close, last.date, &config.execution);
            if let Some(point) = portfolio.equity_curve.last_mut() {
                point.equity = portfolio.cash;
            }
        }
    }

    BacktestResult {
        portfolio,
        bars_simulated,
        entries_skipped,
    }
}
