//! Error types shared across the library

use thiserror::Error;

/// Precondition failure for a projection request.
///
/// Not fatal: callers show a "fill in required fields" message and skip
/// the computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("Please fill in the required fields: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),
}

impl ParamsError {
    /// Names of the required fields that were missing or non-positive
    pub fn fields(&self) -> &[&'static str] {
        match self {
            ParamsError::MissingRequired(fields) => fields,
        }
    }
}

/// Errors raised while loading schedules or scenarios from CSV
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tax schedule: {0}")]
    InvalidSchedule(String),
}

/// Errors raised when a live exchange-rate payload is unusable
#[derive(Debug, Error)]
pub enum RateError {
    #[error("Rate payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rate payload has no USD/TRY quote")]
    MissingQuote,

    #[error("Rate must be positive, got {0}")]
    NonPositive(f64),

    #[error("Rate request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while writing an export sheet
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
