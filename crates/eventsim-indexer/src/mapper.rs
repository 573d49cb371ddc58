// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record to document mapping.
//!
//! Walks a record's fields in schema order, drops nulls, rewrites the
//! timestamp field to ISO-8601 and captures the three identity fields.
//! Records lacking any identity field are skipped without error.

use crate::document::{Document, Field};
use crate::record::{Record, Value};
use crate::timestamp::iso8601_utc;

/// Field names agreed upon with the eventsim producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedField {
    /// `ts`: event time in epoch milliseconds.
    Timestamp,
    /// `userId`
    UserId,
    /// `sessionId`
    SessionId,
}

impl ReservedField {
    /// Exact, case-sensitive lookup of a reserved field name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ts" => Some(Self::Timestamp),
            "userId" => Some(Self::UserId),
            "sessionId" => Some(Self::SessionId),
            _ => None,
        }
    }

    /// The field name as it appears in the source.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Timestamp => "ts",
            Self::UserId => "userId",
            Self::SessionId => "sessionId",
        }
    }
}

/// Maps eventsim records to indexing documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMapper;

impl DocumentMapper {
    /// Create a new mapper.
    pub fn new() -> Self {
        Self
    }

    /// Map a record to a document.
    ///
    /// Returns `None` when the record has no non-null fields or lacks any of
    /// `userId`, `sessionId` or an integer `ts`.
    pub fn map(&self, record: &Record) -> Option<Document> {
        let mut fields = Vec::with_capacity(record.len());
        let mut user_id: Option<String> = None;
        let mut session_id: Option<String> = None;
        let mut ts: Option<i64> = None;

        for (name, value) in record.iter() {
            if value.is_null() {
                continue;
            }

            let value = match ReservedField::from_name(name) {
                Some(ReservedField::Timestamp) => match value.as_long().and_then(normalize) {
                    Some((millis, iso)) => {
                        ts = Some(millis);
                        Value::String(iso)
                    }
                    // Unusable timestamp: emitted raw, record is skipped below.
                    None => value.clone(),
                },
                Some(ReservedField::UserId) => {
                    user_id = Some(value.to_string());
                    value.clone()
                }
                Some(ReservedField::SessionId) => {
                    session_id = Some(value.to_string());
                    value.clone()
                }
                None => value.clone(),
            };

            fields.push(Field::new(name, value));
        }

        if fields.is_empty() {
            return None;
        }

        let (user_id, session_id, ts) = (user_id?, session_id?, ts?);
        let id = format!("{}-{}-{}", user_id, session_id, ts);
        Some(Document::new(id, fields))
    }
}

fn normalize(millis: i64) -> Option<(i64, String)> {
    iso8601_utc(millis).map(|iso| (millis, iso))
}
