// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Tally API
//!
//! This crate defines the HTTP endpoints used to query aggregated counts
//! and to read and write the in-process string cache.
//!
//! ### HTTP Endpoints
//! - `POST /info` with `{startDate, endDate, minCount, maxCount}`
//! - `POST /set` with `{key, value}`
//! - `GET /get?<key>`
//! - `GET /health`
//! - `GET /metrics`

/// The shared string cache
pub mod cache;
/// The http endpoint listener
pub mod listener;
/// API response structs
pub mod responses;
/// Query validation and execution
pub mod service;

#[macro_use]
extern crate rocket;

pub use listener::{
    construct_rocket,
    rocket_config,
};
pub use service::QueryService;
