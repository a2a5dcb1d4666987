// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::{
    Deserialize,
    Serialize,
};
use tally_common::types::CacheEntry;

/// Non-envelope success bodies
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListenerResponse {
    /// Response of GET /health
    Health {
        #[allow(missing_docs)]
        name: String,
        #[allow(missing_docs)]
        version: String,
        #[serde(rename = "isHealthy")]
        #[allow(missing_docs)]
        is_healthy: bool,
        #[serde(rename = "cachedEntries")]
        #[allow(missing_docs)]
        cached_entries: usize,
    },
    /// Response of POST /set and GET /get?<key>
    Entry(CacheEntry),
}

impl From<CacheEntry> for ListenerResponse {
    fn from(entry: CacheEntry) -> Self {
        Self::Entry(entry)
    }
}
