//! Configuration validation.
//!
//! Validates the `[backtest]` and `[signals]` sections before any data is
//! loaded or a single forecast is attempted.

use crate::domain::error::FortunaError;
use crate::domain::strategy::Rebalance;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    validate_symbol(config)?;
    validate_start_date(config)?;
    validate_initial_capital(config)?;
    validate_position_size(config)?;
    validate_costs(config)?;
    validate_rebalance(config)?;
    validate_risk_free_rate(config)?;
    Ok(())
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    validate_lookback(config)?;
    validate_pred_len(config)?;
    validate_threshold(config)?;
    validate_oracle(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> FortunaError {
    FortunaError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(invalid("backtest", "symbol", "symbol must not be empty")),
        None => Err(FortunaError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_start_date(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    match config.get_string("backtest", "start_date") {
        None => Err(FortunaError::ConfigMissing {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
        }),
        Some(_) => config.get_date("backtest", "start_date").map(|_| ()).ok_or_else(|| {
            invalid(
                "backtest",
                "start_date",
                "invalid start_date format, expected YYYY-MM-DD",
            )
        }),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    let value = config.get_double("backtest", "initial_capital", 10000.0);
    if value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_position_size(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    let value = config.get_double("backtest", "position_size", 0.95);
    if value <= 0.0 || value > 1.0 {
        return Err(invalid(
            "backtest",
            "position_size",
            "position_size must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_costs(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    for key in ["commission_per_trade", "commission_pct", "slippage_pct"] {
        let value = config.get_double("backtest", key, 0.0);
        if value < 0.0 {
            return Err(invalid(
                "backtest",
                key,
                format!("{key} must be non-negative"),
            ));
        }
    }
    Ok(())
}

fn validate_rebalance(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    match config.get_string("backtest", "rebalance") {
        None => Ok(()), // defaults to daily
        Some(s) => s
            .parse::<Rebalance>()
            .map(|_| ())
            .map_err(|e| invalid("backtest", "rebalance", e.to_string())),
    }
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    let value = config.get_int("signals", "lookback", 126);
    if value <= 0 {
        return Err(invalid("signals", "lookback", "lookback must be positive"));
    }
    Ok(())
}

fn validate_pred_len(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    let value = config.get_int("signals", "pred_len", 21);
    if value <= 0 {
        return Err(invalid("signals", "pred_len", "pred_len must be positive"));
    }
    Ok(())
}

fn validate_threshold(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    let value = config.get_double("signals", "threshold", 0.0);
    if !value.is_finite() {
        return Err(invalid("signals", "threshold", "threshold must be finite"));
    }
    Ok(())
}

fn validate_oracle(config: &dyn ConfigPort) -> Result<(), FortunaError> {
    match config.get_string("signals", "oracle").as_deref() {
        None | Some("drift") => Ok(()),
        Some("replay") => match config.get_string("signals", "replay_path") {
            Some(p) if !p.trim().is_empty() => Ok(()),
            _ => Err(FortunaError::ConfigMissing {
                section: "signals".to_string(),
                key: "replay_path".to_string(),
            }),
        },
        Some(other) => Err(invalid(
            "signals",
            "oracle",
            format!("unknown oracle backend: {other} (expected drift or replay)"),
        )),
    }
}
