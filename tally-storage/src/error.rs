// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;
use thiserror::Error;

/// Any failure to read from the store. Callers treat every variant alike.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error(transparent)]
    #[allow(missing_docs)]
    Mongo(#[from] mongodb::error::Error),
    /// A result row did not have the expected shape
    #[error("Malformed aggregation row: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("Query did not complete within {0:?}")]
    #[allow(missing_docs)]
    Timeout(Duration),
    #[error(transparent)]
    #[allow(missing_docs)]
    Other(#[from] anyhow::Error),
}
