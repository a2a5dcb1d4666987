// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::access::AggregatedRecord;
use std::sync::Arc;

mod memory;
mod mongo;
mod timed;

pub use memory::MemoryRepository;
pub use mongo::MongoRepository;
pub use timed::TimedRepository;

/// A store able to answer count queries.
///
/// Implementations must be safe to share between concurrent requests; a
/// query either returns every matching record or fails as a whole.
#[async_trait]
pub trait CountRepository: Send + Sync {
    /// Run the count pipeline for a validated query
    async fn aggregate_counts(&self, query: &CountQuery) -> Result<Vec<AggregatedRecord>, StorageError>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<(), StorageError>;
}

#[async_trait]
impl<R: CountRepository + ?Sized> CountRepository for Arc<R> {
    async fn aggregate_counts(&self, query: &CountQuery) -> Result<Vec<AggregatedRecord>, StorageError> {
        (**self).aggregate_counts(query).await
    }

    async fn ping(&self) -> Result<(), StorageError> {
        (**self).ping().await
    }
}
