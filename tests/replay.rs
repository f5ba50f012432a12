// cargo test --test replay -- --nocapture
#[tokio::test]
async fn main() -> anyhow::Result<()> {
    use std::time::Duration;
    use trip_relay::{
        memory::{MemoryQueue, MemoryStore},
        Record, ReplayConsumer, ReplayOptions, ReplayReport, Value,
    };

    env_logger::init();

    fn record(fields: &[(&str, Value)]) -> Record {
        fields.iter().cloned().collect()
    }

    let store = MemoryStore::new("trip_id");
    store.insert(record(&[
        ("trip_id", Value::from("A1")),
        ("fare", Value::Float(20.0)),
    ]));
    store.insert(record(&[
        ("trip_id", Value::from("C3")),
        ("vendor", Value::Int(1)),
        ("fare", Value::Float(4.0)),
    ]));

    let queue = MemoryQueue::new();
    queue.send_record(&record(&[("trip_id", Value::from("A1"))]))?;
    queue.send_record(&record(&[
        ("trip_id", Value::from("B2")),
        ("fare", Value::Float(12.5)),
    ]))?;
    queue.send_record(&record(&[
        ("trip_id", Value::from("C3")),
        ("fare", Value::Float(9.0)),
    ]))?;

    let mut options = ReplayOptions::default();
    options.set_wait_time(Duration::from_millis(50));
    let consumer = ReplayConsumer::new(queue.clone(), store.clone(), options);

    let report = consumer.run().await?;
    assert_eq!(
        report,
        ReplayReport {
            polls: 2,
            received: 3,
            acknowledged: 1,
            skipped: 2,
            failed: 0,
        }
    );

    // A1 had nothing to update, B2 is not in the store: both stay on the queue
    assert_eq!(
        queue.bodies(),
        [
            r#"{"record":{"trip_id":"A1"}}"#,
            r#"{"record":{"trip_id":"B2","fare":12.5}}"#,
        ]
    );
    // C3 was deleted with the receipt of its one delivery
    assert_eq!(queue.deleted(), ["rcpt-3"]);

    assert_eq!(store.updates(), 1);
    assert_eq!(store.len(), 2);
    assert!(store.row(&Value::from("B2")).is_none());
    assert_eq!(
        store.row(&Value::from("C3")).map(|r| r.to_json()).transpose()?,
        Some(r#"{"trip_id":"C3","vendor":1,"fare":9.0}"#.to_owned())
    );
    assert_eq!(
        store.row(&Value::from("A1")).map(|r| r.to_json()).transpose()?,
        Some(r#"{"trip_id":"A1","fare":20.0}"#.to_owned())
    );

    Ok(())
}
