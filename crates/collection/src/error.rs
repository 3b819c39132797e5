use thiserror::Error;
use wgapi_io::IoError;

use crate::Key;

/// Errors returned by collection operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CollectionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("key not found: {0}")]
    KeyNotFound(Key),
    #[error("auto-increment index exhausted: no free index for {requested} value(s)")]
    IndexExhausted { requested: usize },
    #[error("deserialization failed: {0}")]
    Deserialization(#[from] IoError),
}

impl CollectionError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type CollectionResult<T> = Result<T, CollectionError>;
