use thiserror::Error;
use trip_relay_types::{StreamErr, StreamResult};

#[derive(Error, Debug, Clone)]
/// Different types of AWS errors.
pub enum AwsErr {
    #[error("Kinesis error: {0}")]
    Kinesis(String),
    #[error("SQS error: {0}")]
    Sqs(String),
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),
    #[error("Conditional check failed: no item with key {0}")]
    ConditionFailed(String),
    #[error("Failed to build request: {0}")]
    Build(String),
    #[error("Unsupported attribute: {0}")]
    UnsupportedAttribute(String),
}

/// A type alias for convenience.
pub type AwsResult<T> = StreamResult<T, AwsErr>;

pub(crate) fn stream_err(err: AwsErr) -> StreamErr<AwsErr> {
    StreamErr::Backend(err)
}
