use thiserror::Error;

/// Errors raised while encoding or decoding binary data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IoError {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("{what} exceeds limit: {actual} > {limit}")]
    LimitExceeded {
        what: &'static str,
        limit: u64,
        actual: u64,
    },
}

impl IoError {
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn limit_exceeded(what: &'static str, limit: u64, actual: u64) -> Self {
        Self::LimitExceeded {
            what,
            limit,
            actual,
        }
    }
}

pub type IoResult<T> = Result<T, IoError>;
