use std::str::Utf8Error;

use crate::{PartitionKey, Record};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A record ready for transport: the serialized payload and the key that routes it.
///
/// It is immutable once created.
pub struct StreamRecord {
    payload: Vec<u8>,
    partition_key: PartitionKey,
}

impl StreamRecord {
    pub fn new(payload: Vec<u8>, partition_key: PartitionKey) -> Self {
        Self {
            payload,
            partition_key,
        }
    }

    /// Serialize the record as JSON, in field order.
    pub fn from_record(
        record: &Record,
        partition_key: PartitionKey,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_vec(record)?, partition_key))
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.payload)
    }

    pub fn partition_key(&self) -> &PartitionKey {
        &self.partition_key
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }

    pub fn take(self) -> (Vec<u8>, PartitionKey) {
        let Self {
            payload,
            partition_key,
        } = self;
        (payload, partition_key)
    }
}
