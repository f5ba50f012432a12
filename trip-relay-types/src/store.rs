use async_trait::async_trait;

use crate::{Record, StreamResult, Value};

#[derive(Debug, Clone, PartialEq)]
/// A set of fields to write onto an existing row, leaving every other stored field untouched.
pub struct PartialUpdate {
    key: Value,
    fields: Record,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// The store's confirmation of an update: the new values of the fields it changed.
pub struct UpdateOutcome {
    pub changed: Record,
}

#[async_trait]
/// A durable store of rows keyed by a single identifier field.
pub trait KeyedStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up the row with the given identifier.
    async fn get(&self, key: &Value) -> StreamResult<Option<Record>, Self::Error>;

    /// Set the fields of an existing row. Must fail, and write nothing, if the row does not exist.
    async fn update(&self, update: &PartialUpdate) -> StreamResult<UpdateOutcome, Self::Error>;
}

impl PartialUpdate {
    /// Build an update from every field of `record` except `id_field`.
    ///
    /// Returns `None` if the identifier is absent or there is nothing else to set.
    pub fn from_record(record: &Record, id_field: &str) -> Option<Self> {
        let key = record.get(id_field)?.clone();
        let fields = record.without(id_field);
        if fields.is_empty() {
            None
        } else {
            Some(Self { key, fields })
        }
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }
}

impl UpdateOutcome {
    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }
}
