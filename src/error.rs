//! Error types for configuration loading, export, and string parsing

use thiserror::Error;

/// Failure to load or save a persisted projection configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error in [{section}] section: {source}")]
    Csv {
        section: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("missing [{0}] section")]
    MissingSection(&'static str),

    #[error("[{0}] section has no data row")]
    MissingRow(&'static str),

    #[error("invalid parameter {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },
}

/// Failure to write projection output
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A string that is not a recognisable calendar month
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised calendar month: {0:?}")]
pub struct PeriodParseError(pub String);

/// A string that names no action plan category
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action plan category: {0:?}")]
pub struct CategoryParseError(pub String);

/// A string that names no repayment or cash timing strategy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct StrategyParseError {
    pub kind: &'static str,
    pub value: String,
}
