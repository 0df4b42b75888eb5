//! Core error types for the return analytics engine.
//!
//! Failures are scoped per instrument and per metric: an invalid history
//! aborts that instrument's report, while a solver failure only demotes the
//! affected metric. Neither stops the remaining instruments.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::solver::SolverError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analytics engine.
#[derive(Error, Debug)]
pub enum Error {
    /// The supplied price history violates the store contract
    /// (empty, unsorted, duplicate dates, non-positive prices).
    #[error("Invalid price history: {0}")]
    InvalidHistory(String),

    #[error("IRR solver failed: {0}")]
    Solver(#[from] SolverError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for caller-supplied parameters and parsed data.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
