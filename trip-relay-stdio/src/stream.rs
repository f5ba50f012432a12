use std::{
    collections::HashMap,
    fmt::Debug,
    io::Write,
    sync::{Arc, Mutex},
};
use trip_relay_types::{
    export::async_trait::async_trait, PutRecordResult, PutResult, StreamErr, StreamKey,
    StreamRecord, StreamService, Timestamp, TIMESTAMP_FORMAT,
};

use crate::{StdioErr, StdioResult};

type Output = Box<dyn Write + Send>;

#[derive(Clone)]
/// Writes each record as one line. Never rejects a record; only a failed write fails the request.
pub struct StdioStream {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    output: Output,
    sequences: HashMap<StreamKey, u64>,
}

impl Debug for StdioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdioStream").finish()
    }
}

impl Default for StdioStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamService for StdioStream {
    type Error = StdioErr;

    /// The current implementation blocks on the write.
    async fn put_records(
        &self,
        stream: &StreamKey,
        records: &[StreamRecord],
    ) -> StdioResult<PutResult> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| StreamErr::Backend(StdioErr::Poisoned))?;
        let Inner { output, sequences } = &mut *inner;
        let seq = sequences.entry(stream.to_owned()).or_insert(0);
        let timestamp = Timestamp::now_utc()
            .format(TIMESTAMP_FORMAT)
            .map_err(|e| StreamErr::Runtime(Box::new(e)))?;

        for record in records {
            writeln!(
                output,
                "[{timestamp} | {stream} | {key} | {seq}] {payload}",
                key = record.partition_key(),
                payload = record.payload_str().map_err(StreamErr::Utf8Error)?,
            )
            .map_err(|e| StreamErr::Backend(StdioErr::IoError(e)))?;
            *seq += 1;
        }
        output
            .flush()
            .map_err(|e| StreamErr::Backend(StdioErr::IoError(e)))?;

        Ok(PutResult {
            failed_count: 0,
            results: vec![PutRecordResult::ok(); records.len()],
        })
    }
}

impl StdioStream {
    pub fn new() -> Self {
        Self::with_output(Box::new(std::io::stdout()))
    }

    /// Write to something other than stdout.
    pub fn with_output(output: Output) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                output,
                sequences: Default::default(),
            })),
        }
    }
}
