//! Point-forecast oracle port trait.
//!
//! The forecaster is treated as an opaque service: given a trailing window
//! of bars it returns the predicted closing price `horizon` trading days
//! past the window's end, or fails. Backends (builtin baseline, replayed
//! fixture, test mock) are interchangeable behind this trait. The contract
//! does not require determinism across calls.

use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, thiserror::Error)]
#[error("forecast failed: {reason}")]
pub struct OracleError {
    pub reason: String,
}

impl OracleError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub trait OraclePort: std::fmt::Debug {
    /// Predicted closing price `horizon` trading days after the last bar of
    /// `window`. `window` is never empty and contains no future bars.
    fn forecast(&self, window: &[OhlcvBar], horizon: usize) -> Result<f64, OracleError>;
}
