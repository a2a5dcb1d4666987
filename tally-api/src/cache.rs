// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::HashMap,
    sync::{
        PoisonError,
        RwLock,
    },
};

/// In-memory string cache shared by every request.
///
/// Reads share the lock, writes hold it exclusively. Entries never expire
/// and are lost when the process stops.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: RwLock<HashMap<String, String>>,
}

impl CacheStore {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value of `key`
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        // A panic while holding the lock cannot leave a half-written map, so poison is ignored.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.into(), value.into());
    }

    /// The current value of `key`, if any
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Number of cached keys
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
