use trip_relay_types::{
    partition, Batch, PublishOutcome, PublishTotals, StreamErr, StreamKey, StreamRecord,
    StreamService,
};

use crate::PublisherOptions;

/// A batch is sent at most this many times: the first round, then one retry of whatever failed.
pub const MAX_ATTEMPTS: usize = 2;

#[derive(Debug, Clone)]
/// Publishes batches to a [`StreamService`], retrying rejected records exactly once.
///
/// Publishing never fails: rejections and transport errors are logged and show up as failed records in the outcome.
pub struct StreamPublisher<S: StreamService> {
    service: S,
    options: PublisherOptions,
}

struct Round {
    accepted: usize,
    rejected: Vec<StreamRecord>,
}

impl<S: StreamService> StreamPublisher<S> {
    pub fn new(service: S, options: PublisherOptions) -> Self {
        Self { service, options }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn options(&self) -> &PublisherOptions {
        &self.options
    }

    /// Send `batch` to `stream` in one request, then resend the rejected records once.
    ///
    /// An empty batch returns an empty outcome without contacting the service.
    /// A transport error ends the attempt: every record of that request counts as failed.
    pub async fn publish(&self, batch: &Batch, stream: &StreamKey) -> PublishOutcome {
        if batch.is_empty() {
            log::info!("No records to send to {stream}");
            return PublishOutcome::empty();
        }

        let mut outcome = PublishOutcome {
            attempted: batch.len(),
            ..Default::default()
        };
        let mut pending = batch.records().to_vec();

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                log::warn!("{} records failed. Retrying once...", pending.len());
                outcome.retried = pending.len();
            }
            let sent = pending.len();
            let round = match self.send(stream, pending).await {
                Ok(round) => round,
                Err((records, e)) => {
                    log::error!("Error sending records to {stream}: {e}");
                    pending = records;
                    break;
                }
            };
            outcome.succeeded += round.accepted;
            pending = round.rejected;
            if attempt == 1 {
                log::info!("Sent {}/{sent} records to {stream}", round.accepted);
            } else {
                log::info!("Retry result: {}/{sent} succeeded", round.accepted);
            }
            if pending.is_empty() {
                break;
            }
        }

        if !pending.is_empty() {
            log::error!(
                "{} records to {stream} still failed after retry",
                pending.len()
            );
        }
        outcome.failed_records = pending;
        outcome
    }

    /// Publish batches one after another, in order.
    pub async fn publish_all<'a, I>(&self, batches: I, stream: &StreamKey) -> PublishTotals
    where
        I: IntoIterator<Item = &'a Batch>,
    {
        let mut totals = PublishTotals::default();
        for batch in batches {
            totals.add(&self.publish(batch, stream).await);
        }
        log::info!(
            "Published {} batches to {stream}: {}/{} records succeeded",
            totals.batches,
            totals.succeeded,
            totals.attempted
        );
        totals
    }

    /// Partition `records` by the configured batch size and publish every batch.
    pub async fn publish_records(
        &self,
        records: Vec<StreamRecord>,
        stream: &StreamKey,
    ) -> PublishTotals {
        let batches = partition(records, self.options.batch_size());
        self.publish_all(&batches, stream).await
    }

    /// One request. Records without a matching result count as rejected.
    async fn send(
        &self,
        stream: &StreamKey,
        records: Vec<StreamRecord>,
    ) -> Result<Round, (Vec<StreamRecord>, StreamErr<S::Error>)> {
        let result = match self.service.put_records(stream, &records).await {
            Ok(result) => result,
            Err(e) => return Err((records, e)),
        };
        if result.results.len() != records.len() {
            log::warn!(
                "{stream} returned {} results for {} records",
                result.results.len(),
                records.len()
            );
        }

        let mut round = Round {
            accepted: 0,
            rejected: Vec::new(),
        };
        for (i, record) in records.into_iter().enumerate() {
            match result.results.get(i) {
                Some(res) if !res.is_err() => round.accepted += 1,
                Some(res) => {
                    log::debug!(
                        "Record {} rejected: {} {}",
                        record.partition_key(),
                        res.error_code.as_deref().unwrap_or_default(),
                        res.error_message.as_deref().unwrap_or_default()
                    );
                    round.rejected.push(record);
                }
                None => round.rejected.push(record),
            }
        }
        Ok(round)
    }
}
