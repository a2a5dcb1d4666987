// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]
//! Common code for Tally

use lazy_static::lazy_static;
use serde::{
    Deserialize,
    Serialize,
};

/// Configuration for the Tally application
pub mod config;
/// Metrics for prometheus integration
pub mod metrics;

/// Common tally types
pub mod types;

pub use mongodb;
