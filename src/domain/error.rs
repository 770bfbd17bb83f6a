//! Domain error types.

/// Top-level error type for fortuna.
///
/// Per-day conditions (out-of-range start, short window, oracle failure)
/// are recoverable and never surface here; only structural defects do.
#[derive(Debug, thiserror::Error)]
pub enum FortunaError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("malformed price series: {reason}")]
    MalformedSeries { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FortunaError {
    /// Process exit code for this error family.
    pub fn exit_code(&self) -> u8 {
        match self {
            FortunaError::Io(_) => 1,
            FortunaError::ConfigParse { .. }
            | FortunaError::ConfigMissing { .. }
            | FortunaError::ConfigInvalid { .. } => 2,
            FortunaError::Data { .. } | FortunaError::NoData { .. } => 3,
            FortunaError::MalformedSeries { .. } => 4,
        }
    }
}

impl From<&FortunaError> for std::process::ExitCode {
    fn from(err: &FortunaError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
