use thiserror::Error;
use trip_relay_types::{StreamErr, StreamResult};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryErr {
    #[error("Service unavailable")]
    Unavailable,
    #[error("Conditional check failed: no row with key {0}")]
    ConditionFailed(String),
    #[error("Receipt is not valid: {0}")]
    ReceiptInvalid(String),
    #[error("State lock poisoned")]
    Poisoned,
}

pub type MemoryResult<T> = StreamResult<T, MemoryErr>;

pub(crate) fn poisoned<T>(_: T) -> StreamErr<MemoryErr> {
    StreamErr::Backend(MemoryErr::Poisoned)
}
