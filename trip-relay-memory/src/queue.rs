use flume::{Receiver, Sender};
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use trip_relay_runtime::timeout;
use trip_relay_types::{
    export::{async_trait::async_trait, serde_json},
    FailureMessage, FailureQueue, RawMessage, ReceiptToken, Record, StreamErr,
    MAX_RECEIVE_MESSAGES,
};

use crate::{error::poisoned, MemoryErr, MemoryResult};

/// How long a received message stays hidden unless overridden.
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
/// A queue with at-least-once delivery.
///
/// Receiving a message hides it for the visibility timeout and issues a new receipt token.
/// Only the latest token of a message that is still hidden can delete it.
pub struct MemoryQueue {
    state: Arc<Mutex<QueueState>>,
    arrivals: (Sender<()>, Receiver<()>),
    visibility_timeout: Duration,
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    next_receipt: u64,
    messages: Vec<Entry>,
    deleted: Vec<String>,
    receives: usize,
}

#[derive(Debug)]
struct Entry {
    id: String,
    body: String,
    receive_count: u32,
    in_flight: Option<(String, Instant)>,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FailureQueue for MemoryQueue {
    type Error = MemoryErr;

    async fn receive(&self, max_messages: usize, wait: Duration) -> MemoryResult<Vec<RawMessage>> {
        let max_messages = max_messages.clamp(1, MAX_RECEIVE_MESSAGES);
        let deadline = Instant::now() + wait;
        {
            let mut state = self.state.lock().map_err(poisoned)?;
            state.receives += 1;
        }
        loop {
            // stale wake-ups are covered by the scan below
            while self.arrivals.1.try_recv().is_ok() {}
            let now = Instant::now();
            let next_visible = {
                let mut state = self.state.lock().map_err(poisoned)?;
                let batch = state.take_visible(now, max_messages, self.visibility_timeout);
                if !batch.is_empty() {
                    log::debug!("Handing out {} messages", batch.len());
                    return Ok(batch);
                }
                state.next_visible()
            };
            if now >= deadline {
                return Ok(Vec::new());
            }
            let mut remaining = deadline - now;
            if let Some(at) = next_visible {
                remaining = remaining.min(at.saturating_duration_since(now));
            }
            // either a new message arrives or an in-flight one times out
            timeout(remaining, self.arrivals.1.recv_async()).await.ok();
        }
    }

    async fn delete(&self, receipt: ReceiptToken) -> MemoryResult<()> {
        let now = Instant::now();
        let mut state = self.state.lock().map_err(poisoned)?;
        let pos = state.messages.iter().position(|m| match &m.in_flight {
            Some((token, until)) => token == receipt.as_str() && *until > now,
            None => false,
        });
        match pos {
            Some(pos) => {
                let entry = state.messages.remove(pos);
                log::debug!("Deleted message {}", entry.id);
                state.deleted.push(receipt.as_str().to_owned());
                Ok(())
            }
            None => Err(StreamErr::Backend(MemoryErr::ReceiptInvalid(
                receipt.as_str().to_owned(),
            ))),
        }
    }
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::with_visibility_timeout(DEFAULT_VISIBILITY_TIMEOUT)
    }

    pub fn with_visibility_timeout(visibility_timeout: Duration) -> Self {
        Self {
            state: Default::default(),
            arrivals: flume::bounded(1),
            visibility_timeout,
        }
    }

    /// Enqueue a raw body. Returns the message id.
    pub fn send<S: Into<String>>(&self, body: S) -> String {
        let id = {
            let mut state = self.lock();
            state.next_id += 1;
            let id = format!("msg-{}", state.next_id);
            state.messages.push(Entry {
                id: id.clone(),
                body: body.into(),
                receive_count: 0,
                in_flight: None,
            });
            id
        };
        // a full channel already holds a pending wake-up
        self.arrivals.0.try_send(()).ok();
        id
    }

    /// Enqueue a failed record, wrapped as `{"record": ...}`.
    pub fn send_record(&self, record: &Record) -> Result<String, serde_json::Error> {
        Ok(self.send(FailureMessage::body(record)?))
    }

    /// Number of messages not yet deleted, in flight or not.
    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bodies of the messages not yet deleted, in enqueue order.
    pub fn bodies(&self) -> Vec<String> {
        self.lock().messages.iter().map(|m| m.body.clone()).collect()
    }

    /// Receipt tokens of every successful delete, in order.
    pub fn deleted(&self) -> Vec<String> {
        self.lock().deleted.clone()
    }

    /// Number of receive calls so far.
    pub fn receives(&self) -> usize {
        self.lock().receives
    }

    /// How many times the message with this id has been handed out.
    pub fn receive_count(&self, id: &str) -> Option<u32> {
        self.lock()
            .messages
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.receive_count)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().expect("Failed to lock MemoryQueue")
    }
}

impl QueueState {
    fn take_visible(&mut self, now: Instant, max: usize, hide_for: Duration) -> Vec<RawMessage> {
        let mut batch = Vec::new();
        for i in 0..self.messages.len() {
            if batch.len() >= max {
                break;
            }
            let visible = match &self.messages[i].in_flight {
                Some((_, until)) => *until <= now,
                None => true,
            };
            if !visible {
                continue;
            }
            self.next_receipt += 1;
            let token = format!("rcpt-{}", self.next_receipt);
            let entry = &mut self.messages[i];
            entry.receive_count += 1;
            entry.in_flight = Some((token.clone(), now + hide_for));
            batch.push(RawMessage {
                message_id: Some(entry.id.clone()),
                body: entry.body.clone(),
                receipt: ReceiptToken::new(token),
            });
        }
        batch
    }

    fn next_visible(&self) -> Option<Instant> {
        self.messages
            .iter()
            .filter_map(|m| m.in_flight.as_ref().map(|(_, until)| *until))
            .min()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_receive_hides_and_delete_consumes() {
        let queue = MemoryQueue::new();
        for i in 0..12 {
            queue.send(format!("{i}"));
        }

        let first = queue.receive(10, Duration::ZERO).await.unwrap();
        assert_eq!(first.len(), 10);
        let second = queue.receive(10, Duration::ZERO).await.unwrap();
        assert_eq!(second.len(), 2);
        assert!(queue
            .receive(10, Duration::from_millis(10))
            .await
            .unwrap()
            .is_empty());

        let mut first = first.into_iter();
        let message = first.next().unwrap();
        queue.delete(message.receipt).await.unwrap();
        assert_eq!(queue.len(), 11);
        assert_eq!(queue.deleted(), ["rcpt-1"]);

        assert!(matches!(
            queue.delete(ReceiptToken::new("rcpt-1")).await,
            Err(StreamErr::Backend(MemoryErr::ReceiptInvalid(_)))
        ));
        assert_eq!(queue.receives(), 3);
    }

    #[tokio::test]
    async fn test_visibility_timeout_expires() {
        let queue = MemoryQueue::with_visibility_timeout(Duration::from_millis(20));
        let id = queue.send("hello");

        let stale = queue.receive(1, Duration::ZERO).await.unwrap().remove(0);
        let fresh = queue
            .receive(1, Duration::from_millis(500))
            .await
            .unwrap()
            .remove(0);
        assert_eq!(fresh.body, "hello");
        assert_eq!(queue.receive_count(&id), Some(2));
        assert_ne!(stale.receipt, fresh.receipt);

        assert!(queue.delete(stale.receipt).await.is_err());
        queue.delete(fresh.receipt).await.unwrap();
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_wake_ups_do_not_pile_up() {
        let queue = MemoryQueue::new();
        for i in 0..5 {
            queue.send(format!("{i}"));
        }
        assert_eq!(queue.arrivals.1.len(), 1);

        assert_eq!(queue.receive(10, Duration::ZERO).await.unwrap().len(), 5);
        assert!(queue.arrivals.1.is_empty());

        let started = Instant::now();
        assert!(queue
            .receive(10, Duration::from_millis(30))
            .await
            .unwrap()
            .is_empty());
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_receive_waits_for_arrival() {
        let queue = MemoryQueue::new();
        let sender = queue.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sender.send("late");
        });
        let messages = queue.receive(10, Duration::from_secs(5)).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, "late");
    }
}
