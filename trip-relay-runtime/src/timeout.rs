#![allow(unreachable_code)]
use std::{fmt::Display, future::Future, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The future did not complete before the deadline.
pub struct TimeoutError;

/// Await `f` for at most `dur`. Without a runtime enabled, this fails immediately.
pub async fn timeout<F: Future>(_dur: Duration, _f: F) -> Result<F::Output, TimeoutError> {
    #[cfg(feature = "runtime-async-std")]
    return async_std::future::timeout(_dur, _f)
        .await
        .map_err(|_| TimeoutError);

    #[cfg(feature = "runtime-tokio")]
    return tokio::time::timeout(_dur, _f)
        .await
        .map_err(|_| TimeoutError);

    Err(TimeoutError)
}

impl Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Deadline has elapsed")
    }
}

impl std::error::Error for TimeoutError {}
