use trip_relay_types::{
    timestamp_now, FailureMessage, FailureQueue, KeyedStore, PartialUpdate, RawMessage,
    StreamResult, Value,
};

use crate::{ReplayErr, ReplayOptions};

#[derive(Debug)]
/// Drains a [`FailureQueue`] of failed records into the existing rows of a [`KeyedStore`].
///
/// For every message: parse the record, look up its row, set every field except the identifier on that row,
/// and delete the message only if the store confirms a change. Rows are never created.
/// Anything short of a confirmed change leaves the message on the queue, to be redelivered after its visibility timeout.
pub struct ReplayConsumer<Q: FailureQueue, S: KeyedStore> {
    queue: Q,
    store: S,
    options: ReplayOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What became of one message.
pub enum Disposition {
    /// The store confirmed the update and the message was deleted.
    Acknowledged,
    /// The message was left on the queue without error.
    Skipped(SkipReason),
    /// Parsing, the lookup, the update or the delete failed. The error has been logged.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The identifier is absent, null or empty.
    MissingIdentifier,
    /// No row with this identifier exists.
    NotInStore,
    /// The record carries no field besides the identifier.
    NothingToUpdate,
    /// The store accepted the update but reported no changed field.
    NotConfirmed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Counts over a whole run. The final, empty poll is included in `polls`.
pub struct ReplayReport {
    pub polls: usize,
    pub received: usize,
    pub acknowledged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl<Q: FailureQueue, S: KeyedStore> ReplayConsumer<Q, S> {
    pub fn new(queue: Q, store: S, options: ReplayOptions) -> Self {
        Self {
            queue,
            store,
            options,
        }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ReplayOptions {
        &self.options
    }

    /// Poll until a poll comes back empty.
    ///
    /// Errors of individual messages are logged and counted. Only a failing poll ends the run early.
    pub async fn run(&self) -> StreamResult<ReplayReport, Q::Error> {
        let mut report = ReplayReport::default();
        loop {
            report.polls += 1;
            match self.poll_once().await? {
                Some(dispositions) => {
                    for disposition in dispositions {
                        report.add(disposition);
                    }
                }
                None => {
                    log::info!("No more messages in the queue");
                    break;
                }
            }
        }
        log::info!(
            "Replay finished after {} polls: {} received, {} acknowledged, {} skipped, {} failed",
            report.polls,
            report.received,
            report.acknowledged,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    /// Receive one batch of messages and process each in turn. `None` if the poll came back empty.
    pub async fn poll_once(&self) -> StreamResult<Option<Vec<Disposition>>, Q::Error> {
        let messages = self
            .queue
            .receive(self.options.max_messages(), self.options.wait_time())
            .await?;
        if messages.is_empty() {
            return Ok(None);
        }
        log::debug!("Received {} messages", messages.len());
        let mut dispositions = Vec::with_capacity(messages.len());
        for message in messages {
            dispositions.push(self.process(message).await);
        }
        Ok(Some(dispositions))
    }

    /// Process one message. Never fails: errors are logged with a timestamp and reported as [`Disposition::Failed`].
    pub async fn process(&self, message: RawMessage) -> Disposition {
        match self.try_process(message).await {
            Ok(disposition) => disposition,
            Err(e) => {
                log::error!("Replay error: {e} | {}", timestamp_now());
                Disposition::Failed
            }
        }
    }

    async fn try_process(
        &self,
        message: RawMessage,
    ) -> Result<Disposition, ReplayErr<Q::Error, S::Error>> {
        let FailureMessage {
            record, receipt, ..
        } = match message.parse() {
            Ok(message) => message,
            Err((_, e)) => return Err(ReplayErr::Parse(e)),
        };
        let id_field = self.options.id_field();

        let key = match record.get(id_field) {
            Some(key) if is_identifier(key) => key,
            _ => {
                log::warn!("Skipping record without {id_field}");
                return Ok(Disposition::Skipped(SkipReason::MissingIdentifier));
            }
        };
        log::info!("Reprocessing {id_field}={key}");

        if self
            .store
            .get(key)
            .await
            .map_err(ReplayErr::<Q::Error, S::Error>::Store)?
            .is_none()
        {
            log::info!("Skipping {id_field} {key}: not found in store");
            return Ok(Disposition::Skipped(SkipReason::NotInStore));
        }

        let update = match PartialUpdate::from_record(&record, id_field) {
            Some(update) => update,
            None => {
                log::info!("No updatable fields for {id_field} {key}");
                return Ok(Disposition::Skipped(SkipReason::NothingToUpdate));
            }
        };

        let outcome = self
            .store
            .update(&update)
            .await
            .map_err(ReplayErr::<Q::Error, S::Error>::Store)?;
        if !outcome.is_changed() {
            log::warn!("Store confirmed no change for {id_field} {key}");
            return Ok(Disposition::Skipped(SkipReason::NotConfirmed));
        }
        log::info!(
            "Updated {id_field} {key}: {}",
            outcome.changed.to_json().unwrap_or_default()
        );

        let token = receipt.to_string();
        self.queue
            .delete(receipt)
            .await
            .map_err(ReplayErr::<Q::Error, S::Error>::Queue)?;
        log::info!("Successfully deleted a message from the queue: {token}");
        Ok(Disposition::Acknowledged)
    }
}

impl ReplayReport {
    pub fn add(&mut self, disposition: Disposition) {
        self.received += 1;
        match disposition {
            Disposition::Acknowledged => self.acknowledged += 1,
            Disposition::Skipped(_) => self.skipped += 1,
            Disposition::Failed => self.failed += 1,
        }
    }
}

fn is_identifier(value: &Value) -> bool {
    value.key_string().is_some_and(|key| !key.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use trip_relay_memory::{MemoryErr, MemoryQueue, MemoryStore};
    use trip_relay_types::{
        export::async_trait::async_trait, Record, ReceiptToken, StreamErr, UpdateOutcome,
    };

    fn record(fields: &[(&str, Value)]) -> Record {
        fields.iter().cloned().collect()
    }

    fn options() -> ReplayOptions {
        let mut options = ReplayOptions::default();
        options.set_wait_time(Duration::ZERO);
        options
    }

    fn setup() -> (MemoryQueue, MemoryStore) {
        let store = MemoryStore::new("trip_id");
        store.insert(record(&[
            ("trip_id", Value::from("C3")),
            ("fare", Value::Float(1.0)),
            ("vendor", Value::Int(2)),
        ]));
        (MemoryQueue::new(), store)
    }

    async fn receive_one(queue: &MemoryQueue) -> RawMessage {
        queue
            .receive(1, Duration::ZERO)
            .await
            .unwrap()
            .pop()
            .unwrap()
    }

    #[tokio::test]
    async fn test_acknowledge_after_confirmed_update() {
        let (queue, store) = setup();
        let consumer = ReplayConsumer::new(queue.clone(), store.clone(), options());
        queue
            .send_record(&record(&[
                ("trip_id", Value::from("C3")),
                ("fare", Value::Float(9.0)),
            ]))
            .unwrap();

        let message = receive_one(&queue).await;
        let receipt = message.receipt.as_str().to_owned();
        assert_eq!(consumer.process(message).await, Disposition::Acknowledged);
        assert_eq!(queue.deleted(), [receipt]);
        assert!(queue.is_empty());
        assert_eq!(
            store.row(&Value::from("C3")).unwrap().to_json().unwrap(),
            r#"{"trip_id":"C3","fare":9.0,"vendor":2}"#
        );
    }

    #[tokio::test]
    async fn test_skips_leave_message() {
        let (queue, store) = setup();
        let consumer = ReplayConsumer::new(queue.clone(), store.clone(), options());

        for (body, reason) in [
            (
                record(&[("fare", Value::Float(9.0))]),
                SkipReason::MissingIdentifier,
            ),
            (
                record(&[("trip_id", Value::Null), ("fare", Value::Float(9.0))]),
                SkipReason::MissingIdentifier,
            ),
            (
                record(&[("trip_id", Value::from("")), ("fare", Value::Float(9.0))]),
                SkipReason::MissingIdentifier,
            ),
            (
                record(&[("trip_id", Value::from("B2")), ("fare", Value::Float(12.5))]),
                SkipReason::NotInStore,
            ),
            (
                record(&[("trip_id", Value::from("C3"))]),
                SkipReason::NothingToUpdate,
            ),
        ] {
            queue.send_record(&body).unwrap();
            let message = receive_one(&queue).await;
            assert_eq!(consumer.process(message).await, Disposition::Skipped(reason));
        }

        assert_eq!(queue.len(), 5);
        assert!(queue.deleted().is_empty());
        assert_eq!(store.updates(), 0);
        assert_eq!(store.gets(), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_fails_alone() {
        let (queue, store) = setup();
        let consumer = ReplayConsumer::new(queue.clone(), store.clone(), options());
        queue.send("not json");
        queue.send(r#"{"trip_id":"C3","fare":2.0}"#);
        queue.send(r#"{"record":{"trip_id":"C3","nested":{"a":1}}}"#);
        queue
            .send_record(&record(&[
                ("trip_id", Value::from("C3")),
                ("tip", Value::Float(3.0)),
            ]))
            .unwrap();

        let dispositions = consumer.poll_once().await.unwrap().unwrap();
        assert_eq!(
            dispositions,
            [
                Disposition::Failed,
                Disposition::Failed,
                Disposition::Failed,
                Disposition::Acknowledged
            ]
        );
        assert_eq!(queue.len(), 3);
        assert_eq!(store.updates(), 1);
    }

    #[derive(Debug, Clone)]
    /// Accepts every update without confirming it, or fails every call.
    struct Stubborn {
        inner: MemoryStore,
        broken: bool,
    }

    #[async_trait]
    impl KeyedStore for Stubborn {
        type Error = MemoryErr;

        async fn get(&self, key: &Value) -> StreamResult<Option<Record>, MemoryErr> {
            if self.broken {
                return Err(StreamErr::Backend(MemoryErr::Unavailable));
            }
            self.inner.get(key).await
        }

        async fn update(&self, _: &PartialUpdate) -> StreamResult<UpdateOutcome, MemoryErr> {
            Ok(UpdateOutcome::default())
        }
    }

    #[tokio::test]
    async fn test_unconfirmed_update_keeps_message() {
        let (queue, store) = setup();
        let store = Stubborn {
            inner: store,
            broken: false,
        };
        let consumer = ReplayConsumer::new(queue.clone(), store, options());
        queue
            .send_record(&record(&[
                ("trip_id", Value::from("C3")),
                ("fare", Value::Float(9.0)),
            ]))
            .unwrap();

        let message = receive_one(&queue).await;
        assert_eq!(
            consumer.process(message).await,
            Disposition::Skipped(SkipReason::NotConfirmed)
        );
        assert_eq!(queue.len(), 1);
        assert!(queue.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_store_error_keeps_message() {
        let (queue, store) = setup();
        let store = Stubborn {
            inner: store,
            broken: true,
        };
        let consumer = ReplayConsumer::new(queue.clone(), store, options());
        queue
            .send_record(&record(&[
                ("trip_id", Value::from("C3")),
                ("fare", Value::Float(9.0)),
            ]))
            .unwrap();

        let report = consumer.run().await.unwrap();
        assert_eq!(
            report,
            ReplayReport {
                polls: 2,
                received: 1,
                acknowledged: 0,
                skipped: 0,
                failed: 1,
            }
        );
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_receipt_is_a_failure() {
        let (queue, store) = setup();
        let consumer = ReplayConsumer::new(queue.clone(), store.clone(), options());
        queue
            .send_record(&record(&[
                ("trip_id", Value::from("C3")),
                ("fare", Value::Float(9.0)),
            ]))
            .unwrap();
        let mut message = receive_one(&queue).await;
        message.receipt = ReceiptToken::new("rcpt-unknown");

        assert_eq!(consumer.process(message).await, Disposition::Failed);
        // the update went through, but the message stays for redelivery
        assert_eq!(store.updates(), 1);
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_run_on_empty_queue() {
        let (queue, store) = setup();
        let consumer = ReplayConsumer::new(queue.clone(), store, options());
        let report = consumer.run().await.unwrap();
        assert_eq!(report.polls, 1);
        assert_eq!(report.received, 0);
        assert_eq!(queue.receives(), 1);
    }
}
