// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integration tests for the partition pipeline
//!
//! Drives loaded eventsim rows through mapping, batching and delivery
//! against the in-memory transport.
//!
//! # Test Coverage
//!
//! - Document identity and field order for a complete event
//! - Silent skipping of incomplete events
//! - Full and final partial batch flushes, in order
//! - Delivery faults failing the partition without losing earlier batches
//! - File loading through partitioned parallel execution

use eventsim_indexer::{
    DeliveryError, Document, Field, IndexerError, JsonLinesSource, MemoryFactory,
    PartitionDriver, PartitionRunner, PartitionState, PipelineConfig, Record, Value,
};
use std::io::Cursor;

fn config(batch_size: usize) -> PipelineConfig {
    PipelineConfig {
        batch_size,
        ..PipelineConfig::unauthenticated(vec!["http://localhost:8764/index".into()])
    }
}

fn event(user: &str, session: &str, ts: i64) -> Record {
    Record::from_pairs([
        ("userId", Value::from(user)),
        ("sessionId", Value::from(session)),
        ("ts", Value::from(ts)),
    ])
}

#[test]
fn test_complete_event_becomes_document() {
    let factory = MemoryFactory::new();
    let record = Record::from_pairs([
        ("userId", Value::from("u1")),
        ("sessionId", Value::from("s1")),
        ("ts", Value::from(1000_i64)),
        ("page", Value::from("Home")),
    ]);

    PartitionDriver::new(0, &config(100), &factory)
        .run([record])
        .expect("run");

    let posted = factory.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(
        posted[0].documents,
        vec![Document::new(
            "u1-s1-1000",
            vec![
                Field::new("userId", "u1"),
                Field::new("sessionId", "s1"),
                Field::new("ts", "1970-01-01T00:00:01Z"),
                Field::new("page", "Home"),
            ]
        )]
    );
}

#[test]
fn test_incomplete_event_is_skipped_without_error() {
    let factory = MemoryFactory::new();
    let record = Record::from_pairs([
        ("userId", Value::Null),
        ("sessionId", Value::from("s1")),
        ("ts", Value::from(1000_i64)),
    ]);

    let stats = PartitionDriver::new(0, &config(100), &factory)
        .run([record])
        .expect("run");

    assert_eq!(stats.rows_skipped, 1);
    assert!(factory.posted().is_empty());
}

#[test]
fn test_five_events_in_batches_of_two() {
    let factory = MemoryFactory::new();
    let records: Vec<Record> = (1..=5).map(|i| event("u", "s", i * 1000)).collect();

    let mut driver = PartitionDriver::new(0, &config(2), &factory);
    driver.run(&records).expect("run");

    assert_eq!(driver.state(), PartitionState::Done);
    assert_eq!(factory.batch_sizes(), vec![2, 2, 1]);
    assert_eq!(
        factory.posted_ids(),
        vec!["u-s-1000", "u-s-2000", "u-s-3000", "u-s-4000", "u-s-5000"]
    );
}

#[test]
fn test_exact_batch_size_flushes_once() {
    let factory = MemoryFactory::new();
    let records: Vec<Record> = (0..4).map(|i| event("u", "s", i)).collect();

    PartitionDriver::new(0, &config(4), &factory)
        .run(&records)
        .expect("run");

    assert_eq!(factory.batch_sizes(), vec![4]);
}

#[test]
fn test_batch_size_plus_remainder() {
    for k in 1..4 {
        let factory = MemoryFactory::new();
        let records: Vec<Record> = (0..4 + k).map(|i| event("u", "s", i)).collect();

        PartitionDriver::new(0, &config(4), &factory)
            .run(&records)
            .expect("run");

        assert_eq!(factory.batch_sizes(), vec![4, k as usize]);
    }
}

#[test]
fn test_no_null_values_are_emitted() {
    let factory = MemoryFactory::new();
    let records = vec![
        Record::from_pairs([
            ("artist", Value::Null),
            ("userId", Value::from("u1")),
            ("length", Value::Null),
            ("sessionId", Value::from(3_i64)),
            ("ts", Value::from(5_000_i64)),
        ]),
        event("u2", "s2", 6_000),
    ];

    PartitionDriver::new(0, &config(10), &factory)
        .run(&records)
        .expect("run");

    for batch in factory.posted() {
        for doc in batch.documents {
            assert!(doc.fields.iter().all(|f| !f.value.is_null()));
            assert!(matches!(doc.field("ts"), Some(Value::String(_))));
        }
    }
}

#[test]
fn test_delivery_fault_fails_partition_and_stops_reading() {
    let factory = MemoryFactory::failing_at(1);
    let records: Vec<Record> = (0..10).map(|i| event("u", "s", i)).collect();

    let mut consumed = 0;
    let feed = records.iter().inspect(|_| consumed += 1);

    let mut driver = PartitionDriver::new(0, &config(3), &factory);
    let err = driver.run(feed).expect_err("must fail");

    assert!(matches!(err, DeliveryError::Other(_)));
    assert_eq!(driver.state(), PartitionState::Failed);
    // First batch stays delivered, nothing after the failing one is read
    assert_eq!(factory.posted_ids(), vec!["u-s-0", "u-s-1", "u-s-2"]);
    assert_eq!(consumed, 6);
}

#[test]
fn test_job_from_json_lines() {
    let lines = r#"{"ts":1538352117000,"userId":"9","sessionId":1,"page":"NextSong","song":"Rockpools"}
{"ts":1538352180000,"userId":"30","sessionId":29,"page":"NextSong","song":"Time For Miracles"}
{"ts":1538352394000,"sessionId":8,"page":"Home","auth":"Logged Out"}
{"ts":1538352416000,"userId":"9","sessionId":1,"page":"NextSong","song":"Harder Better Faster Stronger"}
{"ts":1538352676000,"userId":"30","sessionId":29,"page":"Logout"}
"#;
    let source = JsonLinesSource::from_reader(Cursor::new(lines)).expect("load");
    let partitions = source.partitions(2);
    let factory = MemoryFactory::new();
    let config = config(2);

    let stats = PartitionRunner::new(&config)
        .run(&partitions, &factory)
        .expect("run");

    assert_eq!(stats.partitions, 2);
    assert_eq!(stats.totals.rows_read, 5);
    assert_eq!(stats.totals.rows_skipped, 1);
    assert_eq!(stats.totals.documents_posted, 4);
    assert_eq!(factory.connections(), 2);

    let docs: Vec<Document> = factory
        .posted()
        .into_iter()
        .flat_map(|b| b.documents)
        .collect();
    let first = docs
        .iter()
        .find(|d| d.id == "9-1-1538352117000")
        .expect("first event");

    // Fields follow the inferred (sorted) schema, nulls dropped
    let names: Vec<&str> = first.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["page", "sessionId", "song", "ts", "userId"]);
    assert_eq!(first.field("ts"), Some(&Value::from("2018-10-01T00:01:57Z")));
    assert_eq!(first.field("sessionId"), Some(&Value::Long(1)));
}

#[test]
fn test_job_fails_if_any_partition_fails() {
    let records: Vec<Record> = (0..8).map(|i| event("u", "s", i)).collect();
    let partitions: Vec<&[Record]> = records.chunks(4).collect();
    let factory = MemoryFactory::failing_at(0);
    let config = config(2);

    let err = PartitionRunner::new(&config)
        .run(&partitions, &factory)
        .expect_err("must fail");

    assert!(matches!(err, IndexerError::Partition { partition: 0, .. }));
}
