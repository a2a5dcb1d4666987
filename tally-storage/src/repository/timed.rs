// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use std::time::Duration;

/// Bounds every call of the wrapped repository by a fixed timeout.
///
/// On expiry the pending call is dropped and [`StorageError::Timeout`] is returned.
#[derive(Clone, Debug)]
pub struct TimedRepository<R> {
    inner: R,
    timeout: Duration,
}

impl<R> TimedRepository<R> {
    #[allow(missing_docs)]
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    #[allow(missing_docs)]
    pub fn inner(&self) -> &R {
        &self.inner
    }

    #[allow(missing_docs)]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<R: CountRepository> CountRepository for TimedRepository<R> {
    async fn aggregate_counts(&self, query: &CountQuery) -> Result<Vec<AggregatedRecord>, StorageError> {
        tokio::time::timeout(self.timeout, self.inner.aggregate_counts(query))
            .await
            .map_err(|_| {
                log::warn!("Aggregation did not complete within {:?}", self.timeout);
                StorageError::Timeout(self.timeout)
            })?
    }

    async fn ping(&self) -> Result<(), StorageError> {
        tokio::time::timeout(self.timeout, self.inner.ping())
            .await
            .map_err(|_| StorageError::Timeout(self.timeout))?
    }
}
