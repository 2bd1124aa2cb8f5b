//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for dcatrader.
#[derive(Debug, thiserror::Error)]
pub enum DcaError {
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("precondition violated in {operation}: {reason}")]
    PreconditionViolation {
        operation: &'static str,
        reason: String,
    },

    #[error("sample at {current} arrived after {previous}")]
    OutOfOrderSample {
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

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

    #[error("unknown asset: {name}")]
    UnknownAsset { name: String },

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DcaError> for std::process::ExitCode {
    fn from(err: &DcaError) -> Self {
        let code: u8 = match err {
            DcaError::Io(_) => 1,
            DcaError::ConfigParse { .. }
            | DcaError::ConfigMissing { .. }
            | DcaError::ConfigInvalid { .. }
            | DcaError::InvalidConfiguration { .. } => 2,
            DcaError::PriceData { .. } => 3,
            DcaError::UnknownAsset { .. } => 4,
            DcaError::NoData { .. } => 5,
            DcaError::PreconditionViolation { .. } | DcaError::OutOfOrderSample { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
