//! Record type definitions for consumed message-log entries
//!
//! A [`Record`] is an immutable snapshot of one log entry, built by the
//! host from the underlying consumer message and handed to a filter for
//! the duration of a single evaluation call.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Logical timestamp in milliseconds since epoch
pub type Timestamp = i64;

/// Partition number within a topic
pub type Partition = i32;

/// Record offset, monotonic within a partition
pub type Offset = i64;

/// One consumed record, read-only to filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Raw payload, rendered as a UTF-8 string
    pub value: String,

    /// Record key
    pub key: String,

    /// Topic the record was consumed from
    pub topic: String,

    /// Broker timestamp in milliseconds
    pub timestamp: Timestamp,

    /// Partition the record lives on
    pub partition: Partition,

    /// Offset within the partition
    pub offset: Offset,

    /// Record headers. Values are kept as raw JSON so arbitrary structure
    /// (strings, numbers, booleans, lists, nested maps) survives the
    /// boundary untouched.
    pub headers: BTreeMap<String, Value>,
}

impl Record {
    /// The record timestamp as a UTC date, `None` if it is out of range.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_converts_to_utc() {
        let record = Record {
            timestamp: 1717842091489,
            ..Default::default()
        };
        let utc = record.timestamp_utc().unwrap();
        assert_eq!(utc.timestamp_millis(), 1717842091489);
    }

    #[test]
    fn out_of_range_timestamp_is_none() {
        let record = Record {
            timestamp: i64::MAX,
            ..Default::default()
        };
        assert!(record.timestamp_utc().is_none());
    }
}
