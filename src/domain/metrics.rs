//! Performance metrics and forecast-quality statistics.

use chrono::NaiveDate;

use super::portfolio::{EquityPoint, Portfolio};
use super::series::PriceSeries;
use super::signal::SignalSeries;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio, risk_free_rate: f64) -> Self {
        let equity_curve = &portfolio.equity_curve;
        let initial_capital = portfolio.initial_capital;

        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let years = equity_curve.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);
        let sharpe_ratio = compute_sharpe(equity_curve, risk_free_rate / TRADING_DAYS_PER_YEAR);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;

        for trade in &portfolio.closed_trades {
            if trade.pnl > 0.0 {
                trades_won += 1;
                total_wins += trade.pnl;
            } else if trade.pnl < 0.0 {
                trades_lost += 1;
                total_losses += trade.pnl.abs();
            }
        }

        let total_trades = portfolio.closed_trades.len();
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };
        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            trades_won,
            trades_lost,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, i64) {
    let mut peak = f64::MIN;
    let mut peak_date: Option<NaiveDate> = None;
    let mut max_drawdown = 0.0_f64;
    let mut max_duration = 0i64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
            peak_date = Some(point.date);
        } else if peak > 0.0 {
            let drawdown = (peak - point.equity) / peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
            if let Some(pd) = peak_date {
                let duration = (point.date - pd).num_days();
                if duration > max_duration {
                    max_duration = duration;
                }
            }
        }
    }

    (max_drawdown, max_duration)
}

fn compute_sharpe(equity_curve: &[EquityPoint], daily_risk_free: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter(|w| w[0].equity > 0.0)
        .map(|w| (w[1].equity - w[0].equity) / w[0].equity - daily_risk_free)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    let std_dev = variance.sqrt();

    if std_dev > 0.0 {
        mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

/// One row of the predicted-vs-actual comparison artifact. `actual_return`
/// is `None` for the final `pred_len` days, where the realized forward
/// return does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    pub predicted_return: f64,
    pub actual_return: Option<f64>,
    pub signal: u8,
}

/// Build comparison rows for every day that carries a generated signal
/// record at or after `start_date`.
pub fn comparison_rows(
    series: &PriceSeries,
    signals: &SignalSeries,
    start_date: NaiveDate,
    pred_len: usize,
) -> Vec<ComparisonRow> {
    let bars = series.bars();
    let mut rows = Vec::new();

    for (i, bar) in bars.iter().enumerate() {
        if bar.date < start_date {
            continue;
        }
        let Some(record) = signals.get(bar.date) else {
            continue;
        };
        let actual_return = bars
            .get(i + pred_len)
            .map(|future| (future.close - bar.close) / bar.close);
        rows.push(ComparisonRow {
            date: bar.date,
            predicted_return: record.predicted_return,
            actual_return,
            signal: record.signal,
        });
    }

    rows
}

/// Forecast-quality summary over days with a realized forward return.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStats {
    pub samples: usize,
    pub correlation: f64,
    pub rmse: f64,
    pub directional_accuracy: f64,
}

impl ForecastStats {
    /// `None` when fewer than two comparable (predicted, actual) pairs
    /// exist. Days whose forecast failed participate with a 0.0 prediction,
    /// matching how they entered the signal stream.
    pub fn compute(rows: &[ComparisonRow]) -> Option<ForecastStats> {
        let pairs: Vec<(f64, f64)> = rows
            .iter()
            .filter_map(|r| r.actual_return.map(|a| (r.predicted_return, a)))
            .collect();
        if pairs.len() < 2 {
            return None;
        }

        let n = pairs.len() as f64;
        let mean_p = pairs.iter().map(|(p, _)| p).sum::<f64>() / n;
        let mean_a = pairs.iter().map(|(_, a)| a).sum::<f64>() / n;

        let mut cov = 0.0;
        let mut var_p = 0.0;
        let mut var_a = 0.0;
        let mut sq_err = 0.0;
        let mut direction_hits = 0usize;

        for (p, a) in &pairs {
            cov += (p - mean_p) * (a - mean_a);
            var_p += (p - mean_p).powi(2);
            var_a += (a - mean_a).powi(2);
            sq_err += (p - a).powi(2);
            if (*p > 0.0) == (*a > 0.0) {
                direction_hits += 1;
            }
        }

        let correlation = if var_p > 0.0 && var_a > 0.0 {
            cov / (var_p.sqrt() * var_a.sqrt())
        } else {
            0.0
        };

        Some(ForecastStats {
            samples: pairs.len(),
            correlation,
            rmse: (sq_err / n).sqrt(),
            directional_accuracy: direction_hits as f64 / n,
        })
    }
}
