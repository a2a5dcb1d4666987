// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;

mod cache;
mod query;
mod response;

pub use cache::*;
pub use query::*;
pub use response::*;
