use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Malformed input data, such as a non-finite coordinate.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A query or construction parameter outside its allowed range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
