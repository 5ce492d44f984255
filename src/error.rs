use thiserror::Error;

// ---------------------------------------------------------------------------
// Library error type
// ---------------------------------------------------------------------------

/// Errors raised by the numerical routines and the dataset containers.
///
/// Degenerate inputs are reported here instead of being folded into NaN or
/// zero results, so bad upstream data is never silently masked.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("empty selection: {0}")]
    EmptySelection(String),

    #[error("division by zero: {0}")]
    DivisionByZero(String),

    #[error("numeric error: {0}")]
    Numeric(String),

    #[error("shape mismatch: {what} (expected {expected}, got {actual})")]
    ShapeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("index {index} out of range for {len} observations")]
    IndexOutOfRange { index: usize, len: usize },
}

impl Error {
    pub(crate) fn shape(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Error::ShapeMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
