use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use trip_relay_types::{
    export::async_trait::async_trait, KeyedStore, PartialUpdate, Record, StreamErr, UpdateOutcome,
    Value,
};

use crate::{error::poisoned, MemoryErr, MemoryResult};

#[derive(Debug, Clone)]
/// A table of rows keyed by one field. Updates never create rows.
pub struct MemoryStore {
    key_field: Arc<String>,
    state: Arc<Mutex<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    rows: HashMap<String, Record>,
    gets: usize,
    updates: usize,
}

#[async_trait]
impl KeyedStore for MemoryStore {
    type Error = MemoryErr;

    async fn get(&self, key: &Value) -> MemoryResult<Option<Record>> {
        let mut state = self.state.lock().map_err(poisoned)?;
        state.gets += 1;
        Ok(key.key_string().and_then(|k| state.rows.get(&k).cloned()))
    }

    async fn update(&self, update: &PartialUpdate) -> MemoryResult<UpdateOutcome> {
        let mut state = self.state.lock().map_err(poisoned)?;
        state.updates += 1;
        let key = update.key().key_string();
        match key.as_ref().and_then(|k| state.rows.get_mut(k)) {
            Some(row) => {
                row.merge(update.fields());
                Ok(UpdateOutcome {
                    changed: update.fields().clone(),
                })
            }
            None => Err(StreamErr::Backend(MemoryErr::ConditionFailed(
                update.key().to_string(),
            ))),
        }
    }
}

impl MemoryStore {
    pub fn new<S: Into<String>>(key_field: S) -> Self {
        Self {
            key_field: Arc::new(key_field.into()),
            state: Default::default(),
        }
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Put a row, replacing any row with the same key. Returns false if the row has no usable key.
    pub fn insert(&self, row: Record) -> bool {
        match row.get(&self.key_field).and_then(Value::key_string) {
            Some(key) => {
                self.lock().rows.insert(key, row);
                true
            }
            None => false,
        }
    }

    /// The stored row, without counting as a `get` call.
    pub fn row(&self, key: &Value) -> Option<Record> {
        let key = key.key_string()?;
        self.lock().rows.get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `get` calls so far.
    pub fn gets(&self) -> usize {
        self.lock().gets
    }

    /// Number of `update` calls so far, successful or not.
    pub fn updates(&self) -> usize {
        self.lock().updates
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("Failed to lock MemoryStore")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(id: &str, fare: f64) -> Record {
        [("trip_id", Value::from(id)), ("fare", Value::Float(fare))]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_update_existing_only() {
        let store = MemoryStore::new("trip_id");
        assert!(store.insert(row("C3", 1.0)));
        assert!(!store.insert([("fare", Value::Float(1.0))].into_iter().collect()));

        let update = PartialUpdate::from_record(
            &[
                ("trip_id", Value::from("C3")),
                ("tip", Value::Float(2.0)),
            ]
            .into_iter()
            .collect(),
            "trip_id",
        )
        .unwrap();
        let outcome = store.update(&update).await.unwrap();
        assert!(outcome.is_changed());
        assert_eq!(
            store.row(&Value::from("C3")).unwrap().to_json().unwrap(),
            r#"{"trip_id":"C3","fare":1.0,"tip":2.0}"#
        );

        let missing = PartialUpdate::from_record(&row("Z9", 3.0), "trip_id").unwrap();
        assert!(matches!(
            store.update(&missing).await,
            Err(StreamErr::Backend(MemoryErr::ConditionFailed(_)))
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.updates(), 2);
        assert_eq!(store.gets(), 0);
    }

    #[tokio::test]
    async fn test_int_and_float_keys_distinct() {
        let store = MemoryStore::new("trip_id");
        assert!(store.insert([("trip_id", Value::Int(12))].into_iter().collect()));
        assert!(store.get(&Value::Int(12)).await.unwrap().is_some());
        assert!(store.get(&Value::Float(12.0)).await.unwrap().is_none());
    }
}
