// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;

/// A cache key and its value, as sent to `/set` and returned by `/get`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[allow(missing_docs)]
    pub key: String,
    #[allow(missing_docs)]
    pub value: String,
}

impl CacheEntry {
    #[allow(missing_docs)]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
