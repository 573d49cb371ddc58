// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Indexing pipeline documents and their wire format.
//!
//! Wire format of one batch:
//! ```text
//! [
//!   {"id": "u1-s1-1000",
//!    "fields": [{"name": "userId", "value": "u1"}, {"name": "ts", "value": "1970-01-01T00:00:01Z"}]},
//!   ...
//! ]
//! ```

use crate::record::Value;
use serde::Serialize;

/// A named, non-null document field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Field name, as in the source record.
    pub name: String,
    /// Field value after normalization.
    pub value: Value,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The unit of delivery to the indexing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Deterministic identity, `<userId>-<sessionId>-<ts>`.
    pub id: String,
    /// Fields in source order.
    pub fields: Vec<Field>,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a field value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

/// Serialize a batch as the pipeline's ingest request body.
pub fn encode_batch(documents: &[Document]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::new(
            "u1-s1-1000",
            vec![
                Field::new("userId", "u1"),
                Field::new("sessionId", "s1"),
                Field::new("ts", "1970-01-01T00:00:01Z"),
                Field::new("itemInSession", 3_i64),
            ],
        )
    }

    #[test]
    fn test_document_wire_format() {
        let value = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(
            value,
            json!({
                "id": "u1-s1-1000",
                "fields": [
                    {"name": "userId", "value": "u1"},
                    {"name": "sessionId", "value": "s1"},
                    {"name": "ts", "value": "1970-01-01T00:00:01Z"},
                    {"name": "itemInSession", "value": 3}
                ]
            })
        );
    }

    #[test]
    fn test_encode_batch_is_array() {
        let body = encode_batch(&[sample(), sample()]).expect("encode");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("parse");

        let docs = value.as_array().expect("array");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["id"], "u1-s1-1000");
    }

    #[test]
    fn test_encode_empty_batch() {
        assert_eq!(encode_batch(&[]).expect("encode"), b"[]");
    }

    #[test]
    fn test_field_lookup() {
        let doc = sample();
        assert_eq!(doc.field("sessionId"), Some(&Value::from("s1")));
        assert!(doc.field("page").is_none());
    }
}
