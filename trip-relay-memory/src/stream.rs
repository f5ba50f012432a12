use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};
use trip_relay_types::{
    export::async_trait::async_trait, PutRecordResult, PutResult, StreamErr, StreamKey,
    StreamRecord, StreamService,
};

use crate::{error::poisoned, MemoryErr, MemoryResult};

/// Error code attached to records rejected by a [`Reply::Reject`].
pub const THROTTLED: &str = "ProvisionedThroughputExceededException";

#[derive(Debug, Clone, PartialEq, Eq)]
/// How the stream answers one `put_records` request.
pub enum Reply {
    /// Accept every record.
    Accept,
    /// Reject the records at these positions of the request; accept the rest.
    Reject(Vec<usize>),
    /// Fail the request as a whole.
    Unavailable,
}

#[derive(Debug, Default, Clone)]
/// A stream that keeps accepted records in memory. Unscripted requests are accepted in full.
pub struct MemoryStream {
    state: Arc<Mutex<StreamState>>,
}

#[derive(Debug, Default)]
struct StreamState {
    replies: VecDeque<Reply>,
    requests: Vec<(StreamKey, Vec<StreamRecord>)>,
    streams: HashMap<StreamKey, Vec<StreamRecord>>,
}

#[async_trait]
impl StreamService for MemoryStream {
    type Error = MemoryErr;

    async fn put_records(
        &self,
        stream: &StreamKey,
        records: &[StreamRecord],
    ) -> MemoryResult<PutResult> {
        let mut state = self.state.lock().map_err(poisoned)?;
        state.requests.push((stream.to_owned(), records.to_vec()));
        let reply = state.replies.pop_front().unwrap_or(Reply::Accept);
        log::debug!("{stream} <- {} records: {reply:?}", records.len());

        let rejected = match reply {
            Reply::Unavailable => return Err(StreamErr::Backend(MemoryErr::Unavailable)),
            Reply::Accept => Vec::new(),
            Reply::Reject(indices) => indices,
        };

        let mut result = PutResult::default();
        let log = state.streams.entry(stream.to_owned()).or_default();
        for (i, record) in records.iter().enumerate() {
            if rejected.contains(&i) {
                result.failed_count += 1;
                result
                    .results
                    .push(PutRecordResult::error(THROTTLED, "Rate exceeded for shard"));
            } else {
                log.push(record.clone());
                result.results.push(PutRecordResult::ok());
            }
        }
        Ok(result)
    }
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue up the reply for the next unanswered request.
    pub fn script(&self, reply: Reply) -> &Self {
        self.lock().replies.push_back(reply);
        self
    }

    /// Number of `put_records` requests received so far.
    pub fn calls(&self) -> usize {
        self.lock().requests.len()
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<(StreamKey, Vec<StreamRecord>)> {
        self.lock().requests.clone()
    }

    /// Records accepted into `stream`, in arrival order.
    pub fn records(&self, stream: &StreamKey) -> Vec<StreamRecord> {
        self.lock().streams.get(stream).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StreamState> {
        self.state.lock().expect("Failed to lock MemoryStream")
    }
}
