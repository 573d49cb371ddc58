// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Epoch-millisecond to ISO-8601 conversion.

use chrono::{DateTime, Utc};

/// Output format: second precision, always UTC (`Z` suffix).
const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format epoch milliseconds as an ISO-8601 UTC date string.
///
/// Sub-second precision is truncated. Returns `None` only when the value
/// falls outside the calendar range chrono can represent.
pub fn iso8601_utc(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format(ISO8601_FORMAT).to_string())
}
