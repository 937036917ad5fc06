//! Error types for the signal service.

use thiserror::Error;

/// Top-level signal service error.
///
/// Every per-instrument failure inside a broadcast cycle surfaces as one of
/// these variants; the scheduler logs it and moves on to the next instrument.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("Insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SignalError {
    /// Whether this failure only means the history was too short.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, SignalError::InsufficientData { .. })
    }
}

impl From<IndicatorError> for SignalError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientData {
                required,
                available,
            } => SignalError::InsufficientData {
                required,
                available,
            },
            other => SignalError::Computation(other.to_string()),
        }
    }
}

/// Market data source errors.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Symbol not supported by data source: {0}")]
    UnknownSymbol(String),

    #[error("No data available for {0}")]
    NoDataAvailable(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Fetch timed out after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Strategy-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
