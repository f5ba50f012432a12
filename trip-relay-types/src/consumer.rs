use async_trait::async_trait;
use serde::Deserialize;
use std::{fmt::Display, time::Duration};

use crate::{Record, StreamResult};

/// The most messages a queue hands out in one receive.
pub const MAX_RECEIVE_MESSAGES: usize = 10;

/// The longest a receive may wait for a message to arrive.
pub const MAX_WAIT_TIME: Duration = Duration::from_secs(20);

#[derive(Debug, PartialEq, Eq, Hash)]
/// Opaque handle proving the right to delete one in-flight queue message.
///
/// It is deliberately not `Clone`: deleting a message consumes its token.
pub struct ReceiptToken(String);

#[derive(Debug, PartialEq, Eq)]
/// A message as handed out by the queue, body not yet interpreted.
pub struct RawMessage {
    pub message_id: Option<String>,
    pub body: String,
    pub receipt: ReceiptToken,
}

#[derive(Debug, PartialEq)]
/// A queue message carrying a record that previously failed downstream processing.
pub struct FailureMessage {
    pub message_id: Option<String>,
    pub record: Record,
    pub receipt: ReceiptToken,
}

#[derive(Deserialize)]
struct FailureBody {
    record: Record,
}

#[async_trait]
/// A queue of records that a downstream consumer failed to process.
///
/// A received message stays in the queue, hidden, until it is deleted or its visibility timeout lapses.
pub trait FailureQueue: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Receive up to `max_messages`, waiting up to `wait` for at least one to arrive.
    /// An empty vector means nothing arrived in time.
    async fn receive(
        &self,
        max_messages: usize,
        wait: Duration,
    ) -> StreamResult<Vec<RawMessage>, Self::Error>;

    /// Delete a received message for good.
    async fn delete(&self, receipt: ReceiptToken) -> StreamResult<(), Self::Error>;
}

impl ReceiptToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ReceiptToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RawMessage {
    /// Interpret the body as `{"record": {...}}`.
    ///
    /// On failure the receipt is handed back, so the caller still owns the message.
    pub fn parse(self) -> Result<FailureMessage, (ReceiptToken, serde_json::Error)> {
        let Self {
            message_id,
            body,
            receipt,
        } = self;
        match serde_json::from_str::<FailureBody>(&body) {
            Ok(FailureBody { record }) => Ok(FailureMessage {
                message_id,
                record,
                receipt,
            }),
            Err(e) => Err((receipt, e)),
        }
    }
}

impl FailureMessage {
    /// The body this message would have on the queue.
    pub fn body(record: &Record) -> Result<String, serde_json::Error> {
        #[derive(serde::Serialize)]
        struct BodyRef<'a> {
            record: &'a Record,
        }

        serde_json::to_string(&BodyRef { record })
    }
}
