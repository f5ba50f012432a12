#![allow(unreachable_code)]
use std::time::Duration;

#[inline]
pub async fn sleep(_s: Duration) {
    #[cfg(feature = "runtime-async-std")]
    return async_std::task::sleep(_s).await;

    #[cfg(feature = "runtime-tokio")]
    return tokio::time::sleep(_s).await;

    panic!("Please enable a runtime");
}

/// Sleep for a duration drawn uniformly from `[min, max)`.
/// If the range is empty, sleep for `min`.
pub async fn sleep_between(min: Duration, max: Duration) {
    sleep(pick_between(min, max)).await
}

/// A duration drawn uniformly from `[min, max)`, or `min` if the range is empty.
pub fn pick_between(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let span = (max - min).as_micros().min(u64::MAX as u128) as u64;
    min + Duration::from_micros(fastrand::u64(0..span))
}
