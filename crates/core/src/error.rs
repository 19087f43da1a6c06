use std::result::Result as StdResult;

use thiserror::Error;

/// Errors that can occur in hookrelay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, RelayError>;
