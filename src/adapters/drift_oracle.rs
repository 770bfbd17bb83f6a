//! Builtin drift-projection oracle.
//!
//! Naive deterministic baseline: the window's mean daily log-return is
//! projected forward `horizon` days from the last close. Keeps the binary
//! runnable without an external forecasting service; not a model.

use crate::domain::ohlcv::OhlcvBar;
use crate::ports::oracle_port::{OracleError, OraclePort};

#[derive(Debug, Default)]
pub struct DriftOracle;

impl DriftOracle {
    pub fn new() -> Self {
        Self
    }
}

impl OraclePort for DriftOracle {
    fn forecast(&self, window: &[OhlcvBar], horizon: usize) -> Result<f64, OracleError> {
        let last = window
            .last()
            .ok_or_else(|| OracleError::new("empty window"))?;
        if window.len() < 2 {
            // No return observable from a single bar: flat projection.
            return Ok(last.close);
        }

        let log_return_sum: f64 = window
            .windows(2)
            .map(|pair| (pair[1].close / pair[0].close).ln())
            .sum();
        let mean_log_return = log_return_sum / (window.len() - 1) as f64;

        if !mean_log_return.is_finite() {
            return Err(OracleError::new("non-finite drift in window"));
        }

        Ok(last.close * (mean_log_return * horizon as f64).exp())
    }
}
