//! ### `trip-relay-runtime`: Async runtime abstraction
//!
//! A small set of functions aligning the type signatures between `async-std` and `tokio`,
//! so that the publisher and the replay consumer can run on either runtime.

#[cfg(all(feature = "runtime-async-std", feature = "runtime-tokio"))]
compile_error!("'runtime-async-std' and 'runtime-tokio' cannot be enabled at the same time");

mod sleep;
mod timeout;

pub use sleep::*;
pub use timeout::*;
