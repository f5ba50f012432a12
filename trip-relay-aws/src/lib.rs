//! ### `trip-relay-aws`: AWS Backend
//!
//! The production implementations of the three external contracts:
//!
//! + [`KinesisStream`]: `PutRecords` against a Kinesis data stream, with per-record error codes
//! + [`SqsQueue`]: `ReceiveMessage` / `DeleteMessage` against an SQS queue acting as the dead-letter queue
//! + [`DynamoStore`]: `GetItem` and a conditional `UpdateItem` against a DynamoDB table
//!
//! All three share one [`aws_config::SdkConfig`], loaded once from [`AwsOptions`] at process start.
//!
//! This crate is built on top of the [AWS SDK for Rust](https://docs.rs/aws-config).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_debug_implementations)]

mod attribute;
mod dynamodb;
mod error;
mod kinesis;
mod options;
mod sqs;

pub use attribute::*;
pub use dynamodb::*;
pub use error::*;
pub use kinesis::*;
pub use options::*;
pub use sqs::*;

/// Re-export of the SDK config type.
pub use aws_config::SdkConfig;
