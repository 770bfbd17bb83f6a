//! Fill simulation: slippage, sizing, commissions.
//!
//! Long-only, single position. Entries commit a configured fraction of
//! available cash in whole shares; exits realize round-trip PnL including
//! both commissions.

use chrono::NaiveDate;

use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Fraction of cash committed on each entry, e.g. 0.95.
    pub position_size: f64,
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            position_size: 0.95,
            commission_per_trade: 0.0,
            commission_pct: 0.0,
            slippage_pct: 0.0,
        }
    }
}

/// flat_fee + (trade_value * pct / 100)
pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    config.commission_per_trade + (trade_value * config.commission_pct / 100.0)
}

/// Buy: execution_price = market_price * (1 + slippage_pct / 100)
pub fn apply_slippage_entry(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 + slippage_pct / 100.0)
}

/// Sell: execution_price = market_price * (1 - slippage_pct / 100)
pub fn apply_slippage_exit(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 - slippage_pct / 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        quantity: i64,
        execution_price: f64,
        cost: f64,
        commission: f64,
    },
    InsufficientCapital,
    AlreadyLong,
}

/// Open a long position at `market_price`.
///
/// Whole shares only; when the affordable quantity is zero or the total
/// cost (including commission) exceeds cash, nothing changes.
pub fn enter_long(
    portfolio: &mut Portfolio,
    symbol: &str,
    market_price: f64,
    date: NaiveDate,
    config: &ExecutionConfig,
) -> EntryResult {
    if portfolio.is_long() {
        return EntryResult::AlreadyLong;
    }

    let execution_price = apply_slippage_entry(market_price, config.slippage_pct);

    let available_capital = portfolio.cash * config.position_size;
    let quantity = (available_capital / execution_price).floor() as i64;

    if quantity == 0 {
        return EntryResult::InsufficientCapital;
    }

    let cost = quantity as f64 * execution_price;
    let commission = calculate_commission(cost, config);
    let total_cost = cost + commission;

    if total_cost > portfolio.cash {
        return EntryResult::InsufficientCapital;
    }

    portfolio.cash -= total_cost;
    portfolio.position = Some(Position {
        symbol: symbol.to_string(),
        quantity,
        entry_price: execution_price,
        entry_date: date,
        entry_commission: commission,
    });

    EntryResult::Entered {
        quantity,
        execution_price,
        cost,
        commission,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub quantity: i64,
    pub exit_price: f64,
    pub exit_value: f64,
    pub exit_commission: f64,
    pub pnl: f64,
}

/// Close the open long at `market_price`. Returns `None` when flat.
pub fn exit_long(
    portfolio: &mut Portfolio,
    market_price: f64,
    exit_date: NaiveDate,
    config: &ExecutionConfig,
) -> Option<ExitResult> {
    let position = portfolio.position.take()?;

    let exit_price = apply_slippage_exit(market_price, config.slippage_pct);
    let exit_value = position.quantity as f64 * exit_price;
    let exit_commission = calculate_commission(exit_value, config);

    let price_pnl = position.quantity as f64 * (exit_price - position.entry_price);
    let pnl = price_pnl - position.entry_commission - exit_commission;

    portfolio.cash += exit_value - exit_commission;

    portfolio.record_trade(ClosedTrade {
        symbol: position.symbol.clone(),
        quantity: position.quantity,
        entry_price: position.entry_price,
        exit_price,
        entry_date: position.entry_date,
        exit_date,
        pnl,
    });

    Some(ExitResult {
        quantity: position.quantity,
        exit_price,
        exit_value,
        exit_commission,
        pnl,
    })
}
