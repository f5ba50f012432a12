//! ### `trip-relay-memory`: In-process backend
//!
//! Implementations of [`StreamService`](trip_relay_types::StreamService),
//! [`FailureQueue`](trip_relay_types::FailureQueue) and [`KeyedStore`](trip_relay_types::KeyedStore)
//! that live entirely in memory, so the publisher and the replay consumer are testable without any cloud account.
//!
//! Every handle is cheap to clone and clones share state, so a test can keep one handle for inspection
//! while another is moved into the component under test.
//!
//! + [`MemoryStream`] replies according to a script of [`Reply`]s, so partial failures and outages can be staged
//! + [`MemoryQueue`] hands out fresh receipt tokens on every receive and hides in-flight messages for a visibility timeout
//! + [`MemoryStore`] only ever updates rows that already exist

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_debug_implementations)]

mod error;
mod queue;
mod store;
mod stream;

pub use error::*;
pub use queue::*;
pub use store::*;
pub use stream::*;
