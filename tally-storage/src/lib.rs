// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Tally Storage
//!
//! Read access to the `records` collection: the aggregation pipeline that
//! turns raw `{key, createdAt, counts}` documents into per-key totals, and the
//! repositories that execute it.

/// Record types and the aggregation pipeline
pub mod access;
/// Repositories executing the pipeline
pub mod repository;

mod error;

pub use error::StorageError;
pub use mongodb;

use async_trait::async_trait;
use serde::{
    Deserialize,
    Serialize,
};
use tally_common::types::CountQuery;
