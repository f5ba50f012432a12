//! ### `trip-relay-types`: Traits & Types
//!
//! This crate defines the records, batches and queue messages that flow through Trip Relay,
//! together with the contracts of the three external systems it talks to:
//!
//! + [`StreamService`]: a partitioned append-only stream that accepts records in batches and reports failure per record
//! + [`FailureQueue`]: a queue of records that a downstream consumer failed to process
//! + [`KeyedStore`]: a durable store of rows keyed by an identifier, updated conditionally
//!
//! It does not provide any implementation.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_debug_implementations)]

mod batch;
mod consumer;
mod error;
mod message;
mod producer;
mod record;
mod store;
mod stream;

pub use batch::*;
pub use consumer::*;
pub use error::*;
pub use message::*;
pub use producer::*;
pub use record::*;
pub use store::*;
pub use stream::*;

pub mod export;
