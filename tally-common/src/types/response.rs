// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use chrono::{
    DateTime,
    Utc,
};

/// Envelope code of a successful query
pub const SUCCESS_CODE: u16 = 0;
/// Envelope message of a successful query
pub const SUCCESS_MESSAGE: &str = "Success";
/// Envelope message when the store could not answer
pub const DATABASE_ERROR_MESSAGE: &str = "Error occurs while getting data from database";
/// Envelope message when `/info` is called with the wrong method
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";

/// One aggregated key, as returned to callers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[allow(missing_docs)]
    pub key: String,
    #[serde(rename = "createdAt")]
    #[allow(missing_docs)]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "totalCount")]
    #[allow(missing_docs)]
    pub total_count: i64,
}

/// The `{code, msg, records}` envelope used for every `/info` answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// `0` on success, an HTTP status code otherwise
    pub code: u16,
    #[serde(rename = "msg")]
    #[allow(missing_docs)]
    pub message: String,
    /// `None` on failure; always present (possibly empty) on success
    pub records: Option<Vec<Record>>,
}

impl QueryResponse {
    /// A success envelope around the given records
    pub fn success(records: Vec<Record>) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: SUCCESS_MESSAGE.to_owned(),
            records: Some(records),
        }
    }

    /// A failure envelope; failures never carry records
    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            records: None,
        }
    }

    #[allow(missing_docs)]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}
