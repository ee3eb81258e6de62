//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for lookahead.
#[derive(Debug, thiserror::Error)]
pub enum LookaheadError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("insufficient data for {requirement}: have {bars} bars, need {minimum}")]
    InsufficientData {
        requirement: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid {field} price {value} at bar {index} ({date})")]
    InvalidPrice {
        index: usize,
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },

    #[error("bar {index} ({date}) is not after the previous bar")]
    UnorderedSeries { index: usize, date: NaiveDate },

    #[error("series length mismatch: {left} bars vs {right} values")]
    LengthMismatch { left: usize, right: usize },

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

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LookaheadError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        LookaheadError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&LookaheadError> for std::process::ExitCode {
    fn from(err: &LookaheadError) -> Self {
        let code: u8 = match err {
            LookaheadError::Io(_) | LookaheadError::Report { .. } => 1,
            LookaheadError::ConfigParse { .. }
            | LookaheadError::ConfigMissing { .. }
            | LookaheadError::ConfigInvalid { .. } => 2,
            LookaheadError::Data { .. } | LookaheadError::NoData { .. } => 3,
            LookaheadError::EmptySeries
            | LookaheadError::InsufficientData { .. }
            | LookaheadError::InvalidPrice { .. }
            | LookaheadError::UnorderedSeries { .. }
            | LookaheadError::LengthMismatch { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
