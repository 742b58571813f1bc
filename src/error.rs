use thiserror::Error;

/// Errors raised while generating, writing or checking bar series
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid parameters for {symbol}: {reason}")]
    InvalidParameters { symbol: String, reason: String },

    #[error("Invalid bar for {symbol} at {timestamp}: {reason}")]
    InvalidBar {
        symbol: String,
        timestamp: String,
        reason: String,
    },

    #[error("Could not parse {field}: {value}")]
    Parse { field: &'static str, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
