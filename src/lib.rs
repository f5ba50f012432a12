//! ### `trip-relay`: Trip event delivery and replay
//!
//! Trip Relay moves rows of trip data into a partitioned, append-only stream, and separately replays
//! records that failed downstream processing from a dead-letter queue back into a keyed store.
//!
//! ## Delivery
//!
//! 1. [`RecordMapper`] turns a row into a [`StreamRecord`]: the row as JSON plus a partition key.
//!    Rows without a usable key are dropped and logged, never retried.
//! 2. [`partition`] slices the mapped records into contiguous [`Batch`]es.
//! 3. [`StreamPublisher`] sends one batch in a single request, finds the records the service rejected,
//!    and retries exactly those once. What still fails is reported in the [`PublishOutcome`], not raised.
//! 4. [`SimulationDriver`] paces two record flows (trip starts and trip ends) through the publisher.
//!
//! ## Replay
//!
//! [`ReplayConsumer`] drains a [`FailureQueue`]: each message carries a record, which is merged into the
//! existing row of a [`KeyedStore`]. The message is deleted only after the store confirms a change;
//! anything else leaves it on the queue for redelivery.
//!
//! ## Backends
//!
//! The external systems are traits defined in `trip-relay-types`. Implementations live in sub-crates:
//!
//! + [trip-relay-aws](https://docs.rs/trip-relay-aws): Kinesis, SQS and DynamoDB (feature `aws`)
//! + [trip-relay-memory](https://docs.rs/trip-relay-memory): in-process, scriptable, used throughout the tests
//! + [trip-relay-stdio](https://docs.rs/trip-relay-stdio): prints records for dry runs
//!
//! [`RelayStream`] picks one of the stream backends at runtime.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_debug_implementations)]

mod backend;
mod driver;
mod error;
mod mapper;
mod options;
mod publisher;
mod replay;
mod source;

pub use backend::*;
pub use driver::*;
pub use error::*;
pub use mapper::*;
pub use options::*;
pub use publisher::*;
pub use replay::*;
pub use source::*;

pub use trip_relay_types::*;

#[cfg(feature = "trip-relay-aws")]
#[cfg_attr(docsrs, doc(cfg(feature = "aws")))]
pub use trip_relay_aws as aws;
pub use trip_relay_memory as memory;
pub use trip_relay_stdio as stdio;
