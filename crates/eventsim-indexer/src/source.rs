// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Eventsim JSON-lines source.
//!
//! Loads one JSON object per line, infers a schema as the sorted union of
//! all top-level keys, and projects every row onto it (absent keys become
//! nulls). Rows are then split into contiguous partitions.

use crate::record::{Record, Schema, Value};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Source loading errors.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: invalid JSON: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: expected a JSON object")]
    NotAnObject { line: usize },
}

type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Rows loaded from an eventsim JSON-lines file.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    schema: Arc<Schema>,
    records: Vec<Record>,
}

impl JsonLinesSource {
    /// Load rows from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load rows from any buffered reader. Blank lines are ignored.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, SourceError> {
        let mut objects: Vec<JsonObject> = Vec::new();
        let mut keys = BTreeSet::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: serde_json::Value = serde_json::from_str(&line)
                .map_err(|source| SourceError::Parse {
                    line: idx + 1,
                    source,
                })?;
            let serde_json::Value::Object(object) = value else {
                return Err(SourceError::NotAnObject { line: idx + 1 });
            };
            keys.extend(object.keys().cloned());
            objects.push(object);
        }

        let schema = Arc::new(Schema::new(keys));
        let records = objects
            .into_iter()
            .map(|mut object| {
                let values = schema
                    .names()
                    .iter()
                    .map(|name| object.remove(name).map_or(Value::Null, json_to_value))
                    .collect();
                Record::new(Arc::clone(&schema), values)
            })
            .collect::<Vec<_>>();

        tracing::debug!("loaded {} rows with {} fields", records.len(), schema.len());
        Ok(Self { schema, records })
    }

    /// Inferred schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// All rows, in file order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no rows were loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split the rows into at most `n` contiguous partitions.
    pub fn partitions(&self, n: usize) -> Vec<&[Record]> {
        partition(&self.records, n)
    }

    /// Consume the source, returning its rows.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Split `rows` into at most `n` contiguous, non-empty, near-equal slices.
///
/// Earlier partitions get one extra row when the split is uneven.
pub fn partition<T>(rows: &[T], n: usize) -> Vec<&[T]> {
    let n = n.max(1).min(rows.len());
    if n == 0 {
        return Vec::new();
    }

    let base = rows.len() / n;
    let extra = rows.len() % n;
    let mut parts = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let len = base + usize::from(i < extra);
        parts.push(&rows[start..start + len]);
        start += len;
    }
    parts
}

/// Convert a JSON value to a record value.
///
/// Objects and arrays are kept as their compact JSON text.
fn json_to_value(val: serde_json::Value) -> Value {
    match val {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Long(i),
            None => n.as_f64().map_or(Value::Null, Value::Double),
        },
        serde_json::Value::String(s) => Value::String(s),
        nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
            Value::String(nested.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EVENTS: &str = r#"{"ts":1538352117000,"userId":"9","sessionId":1,"page":"NextSong","artist":"Martha Tilston"}
{"ts":1538352180000,"userId":"30","sessionId":29,"page":"Home","length":277.89016}

{"ts":1538352394000,"userId":"","sessionId":8,"page":"Home","auth":"Logged Out"}
"#;

    #[test]
    fn test_schema_is_sorted_union() {
        let source = JsonLinesSource::from_reader(Cursor::new(EVENTS)).expect("load");

        assert_eq!(
            source.schema().names(),
            ["artist", "auth", "length", "page", "sessionId", "ts", "userId"]
        );
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn test_missing_keys_become_null() {
        let source = JsonLinesSource::from_reader(Cursor::new(EVENTS)).expect("load");
        let second = &source.records()[1];

        assert!(second.get("artist").expect("artist").is_null());
        assert_eq!(second.get("length"), Some(&Value::Double(277.89016)));
        assert_eq!(second.get("sessionId"), Some(&Value::Long(29)));
        assert_eq!(second.get("ts"), Some(&Value::Long(1_538_352_180_000)));
    }

    #[test]
    fn test_nested_values_kept_as_json_text() {
        let source =
            JsonLinesSource::from_reader(Cursor::new(r#"{"tags":["a","b"],"meta":{"x":1}}"#))
                .expect("load");
        let row = &source.records()[0];

        assert_eq!(row.get("tags"), Some(&Value::from(r#"["a","b"]"#)));
        assert_eq!(row.get("meta"), Some(&Value::from(r#"{"x":1}"#)));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = JsonLinesSource::from_reader(Cursor::new("{\"a\":1}\n{oops\n"))
            .expect_err("must fail");
        assert!(matches!(err, SourceError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = JsonLinesSource::from_reader(Cursor::new("[1,2]\n")).expect_err("must fail");
        assert!(matches!(err, SourceError::NotAnObject { line: 1 }));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.json");
        std::fs::write(&path, EVENTS).expect("write");

        let source = JsonLinesSource::from_path(&path).expect("load");
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn test_partition_even_and_uneven() {
        let rows: Vec<u32> = (0..7).collect();

        let parts = partition(&rows, 3);
        let sizes: Vec<usize> = parts.iter().map(|p| p.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
        assert_eq!(parts[1], &[3u32, 4][..]);
        assert_eq!(parts[2], &[5u32, 6][..]);

        let parts = partition(&rows, 1);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 7);
    }

    #[test]
    fn test_partition_never_yields_empty_slices() {
        let rows = [1, 2];
        assert_eq!(partition(&rows, 8).len(), 2);
        assert_eq!(partition(&rows, 0).len(), 1);
        assert!(partition::<u8>(&[], 4).is_empty());
    }
}
