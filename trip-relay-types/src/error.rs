use std::str::Utf8Error;
use thiserror::Error;

/// Type alias of the [`Result`] type specific to `trip-relay`.
pub type StreamResult<T, E> = std::result::Result<T, StreamErr<E>>;

#[derive(Error, Debug)]
/// Common errors that may occur.
pub enum StreamErr<E: std::error::Error> {
    #[error("Utf8Error: {0}")]
    Utf8Error(Utf8Error),
    #[error("Backend error: {0}")]
    Backend(E),
    #[error("Runtime error: {0}")]
    Runtime(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors that may happen when handling StreamKey
pub enum StreamKeyErr {
    #[error("Invalid stream key: valid pattern is [a-zA-Z0-9._-]{{1, 128}}")]
    InvalidStreamKey,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors that may happen when handling PartitionKey
pub enum PartitionKeyErr {
    #[error("Partition key is empty")]
    Empty,
    #[error("Partition key is longer than {max} characters: {len}")]
    TooLong { len: usize, max: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors that may happen when sizing a Batch
pub enum BatchErr {
    #[error("Batch size must be greater than zero")]
    ZeroSize,
    #[error("Batch size is not a number: `{0}`")]
    Invalid(String),
    #[error("Batch of {0} records exceeds the limit of {max}", max = crate::MAX_PUT_RECORDS)]
    TooLarge(usize),
}

impl<E: std::error::Error> StreamErr<E> {
    /// Re-wrap the backend error into another type, leaving every other variant intact.
    pub fn map_backend<F: std::error::Error, M: FnOnce(E) -> F>(self, m: M) -> StreamErr<F> {
        match self {
            StreamErr::Backend(e) => StreamErr::Backend(m(e)),
            StreamErr::Utf8Error(e) => StreamErr::Utf8Error(e),
            StreamErr::Runtime(e) => StreamErr::Runtime(e),
        }
    }
}
