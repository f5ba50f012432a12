#[cfg(feature = "trip-relay-aws")]
use trip_relay_aws::AwsErr;
use trip_relay_memory::MemoryErr;
use trip_relay_stdio::StdioErr;

use thiserror::Error;
use trip_relay_types::{StreamErr, StreamResult};

use crate::Backend;

/// `trip-relay` the concrete error type of a runtime-selected backend.
pub type Error = StreamErr<BackendErr>;

#[derive(Error, Debug)]
/// `trip-relay` the concrete backend error.
pub enum BackendErr {
    #[cfg(feature = "trip-relay-aws")]
    #[error("AwsBackendErr: {0}")]
    Aws(AwsErr),
    #[error("StdioBackendErr: {0}")]
    Stdio(StdioErr),
    #[error("MemoryBackendErr: {0}")]
    Memory(MemoryErr),
}

#[derive(Error, Debug)]
/// Why one replayed message could not be applied.
pub enum ReplayErr<Q: std::error::Error, S: std::error::Error> {
    #[error("Malformed message body: {0}")]
    Parse(serde_json::Error),
    #[error("Queue error: {0}")]
    Queue(StreamErr<Q>),
    #[error("Store error: {0}")]
    Store(StreamErr<S>),
}

#[derive(Error, Debug)]
/// Errors while loading source rows.
pub enum SourceErr {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

#[cfg(feature = "trip-relay-aws")]
impl From<AwsErr> for BackendErr {
    fn from(err: AwsErr) -> Self {
        Self::Aws(err)
    }
}

impl From<StdioErr> for BackendErr {
    fn from(err: StdioErr) -> Self {
        Self::Stdio(err)
    }
}

impl From<MemoryErr> for BackendErr {
    fn from(err: MemoryErr) -> Self {
        Self::Memory(err)
    }
}

impl BackendErr {
    /// Identifies the backend that raised this error.
    pub fn backend(&self) -> Backend {
        match self {
            #[cfg(feature = "trip-relay-aws")]
            Self::Aws(_) => Backend::Aws,
            Self::Stdio(_) => Backend::Stdio,
            Self::Memory(_) => Backend::Memory,
        }
    }
}

pub(crate) type RelayResult<T> = StreamResult<T, BackendErr>;

pub(crate) fn map_err<E: std::error::Error + Into<BackendErr>>(
    err: StreamErr<E>,
) -> StreamErr<BackendErr> {
    err.map_backend(Into::into)
}
