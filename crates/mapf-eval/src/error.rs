//! Error types for mapf-eval.

use thiserror::Error;

/// Errors that can occur while evaluating or writing metrics.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("planning fault: {0}")]
    Planning(#[from] mapf_core::MapfError),
}

/// Alias for `Result<T, EvalError>`.
pub type EvalResult<T> = Result<T, EvalError>;
