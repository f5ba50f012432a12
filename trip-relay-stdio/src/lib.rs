//! ### `trip-relay-stdio`: Standard I/O Backend
//!
//! A [`StreamService`](trip_relay_types::StreamService) that prints every record instead of sending it anywhere.
//! Handy for dry runs of the simulation driver:
//!
//! ```shell
//! [2026-10-16T07:06:00.123 | start-trip-stream | A1 | 0] {"trip_id":"A1","fare":12.5}
//! ```
//!
//! The number after the partition key is a sequence number, counted per stream.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_debug_implementations)]

mod error;
mod stream;

pub use error::*;
pub use stream::*;
