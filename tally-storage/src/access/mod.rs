// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

mod pipeline;
mod records;

pub use pipeline::*;
pub use records::*;

use super::*;
use bson::{
    doc,
    Document,
};
use chrono::{
    DateTime,
    Utc,
};
