use async_trait::async_trait;

use crate::{StreamKey, StreamRecord, StreamResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The result of a single record within a `put_records` request.
pub struct PutRecordResult {
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The response of a `put_records` request. `results` is aligned positionally with the request.
pub struct PutResult {
    pub failed_count: usize,
    pub results: Vec<PutRecordResult>,
}

#[async_trait]
/// A partitioned, append-only stream that accepts records in batches.
pub trait StreamService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append all `records` to `stream` in one request.
    ///
    /// Returning `Ok` does not mean every record was accepted: consult the per-record results.
    /// Returning `Err` means the request as a whole failed to go through.
    async fn put_records(
        &self,
        stream: &StreamKey,
        records: &[StreamRecord],
    ) -> StreamResult<PutResult, Self::Error>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// What happened to one batch handed to the publisher.
pub struct PublishOutcome {
    /// Number of records in the batch.
    pub attempted: usize,
    /// Records accepted in the first round plus records accepted in the retry round.
    pub succeeded: usize,
    /// Size of the retry round; zero if nothing was retried.
    pub retried: usize,
    /// Records that were still rejected after the retry, in batch order.
    pub failed_records: Vec<StreamRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Running totals over many [`PublishOutcome`]s.
pub struct PublishTotals {
    pub batches: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl PutRecordResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn error<S: Into<String>>(code: S, message: S) -> Self {
        Self {
            error_code: Some(code.into()),
            error_message: Some(message.into()),
        }
    }

    pub fn is_err(&self) -> bool {
        self.error_code.is_some()
    }
}

impl PublishOutcome {
    /// The outcome of a batch that was never sent because it was empty.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failed(&self) -> usize {
        self.failed_records.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_records.is_empty()
    }
}

impl PublishTotals {
    pub fn add(&mut self, outcome: &PublishOutcome) {
        self.batches += 1;
        self.attempted += outcome.attempted;
        self.succeeded += outcome.succeeded;
        self.failed += outcome.failed();
    }
}
