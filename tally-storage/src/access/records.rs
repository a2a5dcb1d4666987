// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use tally_common::types::Record;

/// A document of the `records` collection.
///
/// Every element of `counts` is one count event for `key` at `created_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[allow(missing_docs)]
    pub key: String,
    #[serde(rename = "createdAt")]
    #[allow(missing_docs)]
    pub created_at: DateTime<Utc>,
    #[allow(missing_docs)]
    pub counts: Vec<i64>,
}

impl RawRecord {
    #[allow(missing_docs)]
    pub fn new(key: impl Into<String>, created_at: DateTime<Utc>, counts: Vec<i64>) -> Self {
        Self {
            key: key.into(),
            created_at,
            counts,
        }
    }

    /// The record as a BSON document, with `createdAt` stored as a BSON date
    pub fn to_document(&self) -> Document {
        doc! {
            "key": &self.key,
            "createdAt": bson::DateTime::from_chrono(self.created_at),
            "counts": self.counts.clone(),
        }
    }
}

/// One output row of the count pipeline: the totals of a single key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    #[serde(rename = "_id")]
    #[allow(missing_docs)]
    pub key: String,
    /// `createdAt` of the first count event seen for the key
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Sum of every count event of the key inside the window
    #[serde(rename = "totalCount")]
    pub total_count: i64,
}

impl From<AggregatedRecord> for Record {
    fn from(record: AggregatedRecord) -> Self {
        Self {
            key: record.key,
            created_at: record.created_at,
            total_count: record.total_count,
        }
    }
}

/// Decode raw pipeline rows, failing on the first row with a missing or mistyped field
pub fn decode_rows(rows: Vec<Document>) -> Result<Vec<AggregatedRecord>, StorageError> {
    rows.into_iter()
        .map(|row| bson::from_document(row).map_err(StorageError::from))
        .collect()
}
