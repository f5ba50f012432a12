use trip_relay_types::{PartitionKey, PartitionKeyErr, Record, StreamRecord};

use crate::MapperOptions;

#[derive(Debug, Default, Clone)]
/// Turns rows into stream records: the row as JSON, keyed by one of its fields.
pub struct RecordMapper {
    options: MapperOptions,
}

#[derive(Debug, Default, Clone, PartialEq)]
/// The result of mapping many rows.
pub struct Mapped {
    /// Mapped records, in row order.
    pub records: Vec<StreamRecord>,
    /// Number of rows dropped for lack of a usable partition key.
    pub skipped: usize,
}

impl RecordMapper {
    pub fn new(options: MapperOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Map one row. Returns `None`, after logging an error, if the partition key field is missing,
    /// null or renders to an unusable key.
    ///
    /// Non-finite numbers are written as `null`, so the payload is always valid JSON.
    pub fn map(&self, mut row: Record) -> Option<StreamRecord> {
        row.normalize_nulls();
        let field = self.options.partition_key_field();
        let key = match row.get(field).and_then(|v| v.key_string()) {
            Some(key) => PartitionKey::new(key),
            None => Err(PartitionKeyErr::Empty),
        };
        let key = match key {
            Ok(key) => key,
            Err(e) => {
                log::error!("Skipping row with missing partition key `{field}`: {e}");
                return None;
            }
        };
        match StreamRecord::from_record(&row, key) {
            Ok(record) => Some(record),
            Err(e) => {
                log::error!("Skipping row that cannot be serialized: {e}");
                None
            }
        }
    }

    /// Map rows in order, dropping and counting those [`Self::map`] rejects.
    pub fn map_rows<I: IntoIterator<Item = Record>>(&self, rows: I) -> Mapped {
        let mut mapped = Mapped::default();
        for row in rows {
            match self.map(row) {
                Some(record) => mapped.records.push(record),
                None => mapped.skipped += 1,
            }
        }
        if mapped.skipped > 0 {
            log::warn!(
                "Mapped {} rows, skipped {}",
                mapped.records.len(),
                mapped.skipped
            );
        }
        mapped
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use trip_relay_types::{partition, BatchSize, Value};

    fn row(fields: &[(&str, Value)]) -> Record {
        fields.iter().cloned().collect()
    }

    #[test]
    fn test_map_row() {
        let mapper = RecordMapper::default();
        let record = mapper
            .map(row(&[
                ("trip_id", Value::from("A1")),
                ("fare", Value::Float(f64::NAN)),
                ("passengers", Value::Int(2)),
            ]))
            .unwrap();
        assert_eq!(record.partition_key().as_str(), "A1");
        assert_eq!(
            record.payload_str().unwrap(),
            r#"{"trip_id":"A1","fare":null,"passengers":2}"#
        );

        let record = mapper.map(row(&[("trip_id", Value::Int(7))])).unwrap();
        assert_eq!(record.partition_key().as_str(), "7");

        let record = mapper.map(row(&[("trip_id", Value::Float(12.0))])).unwrap();
        assert_eq!(record.partition_key().as_str(), "12.0");
    }

    #[test]
    fn test_skip_unusable_keys() {
        let mapper = RecordMapper::default();
        assert!(mapper.map(row(&[("fare", Value::Float(1.0))])).is_none());
        assert!(mapper.map(row(&[("trip_id", Value::Null)])).is_none());
        assert!(mapper.map(row(&[("trip_id", Value::from(""))])).is_none());
        assert!(mapper
            .map(row(&[("trip_id", Value::Float(f64::NAN))]))
            .is_none());
        assert!(mapper
            .map(row(&[("trip_id", Value::from("x".repeat(257)))]))
            .is_none());
    }

    #[test]
    fn test_custom_key_field() {
        let mut options = MapperOptions::default();
        options.set_partition_key_field("vendor");
        let mapper = RecordMapper::new(options);
        let record = mapper
            .map(row(&[
                ("trip_id", Value::from("A1")),
                ("vendor", Value::from("V9")),
            ]))
            .unwrap();
        assert_eq!(record.partition_key().as_str(), "V9");
    }

    #[test]
    fn test_skipped_rows_never_batched() {
        let rows = (0..30).map(|i| {
            let id = match i % 3 {
                0 => Value::Null,
                1 => Value::from(""),
                _ => Value::from(format!("T{i}")),
            };
            row(&[("trip_id", id), ("n", Value::Int(i))])
        });
        let mapped = RecordMapper::default().map_rows(rows);
        assert_eq!(mapped.records.len(), 10);
        assert_eq!(mapped.skipped, 20);

        for batch in partition(mapped.records, BatchSize::new(3).unwrap()) {
            for record in batch.records() {
                assert!(record.partition_key().as_str().starts_with('T'));
            }
        }
    }
}
