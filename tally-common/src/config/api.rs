// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use anyhow::ensure;
use std::net::{
    IpAddr,
    Ipv4Addr,
};

/// Configuration for the Tally API
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ApiConfig {
    /// Interface the listener binds to
    pub address: IpAddr,
    #[allow(missing_docs)]
    pub port: u16,
    /// Seconds in-flight requests get to finish once shutdown is requested
    pub shutdown_grace: u32,
    /// Seconds connections get to close after the grace period
    pub shutdown_mercy: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: Ipv4Addr::UNSPECIFIED.into(),
            port: 80,
            shutdown_grace: 5,
            shutdown_mercy: 5,
        }
    }
}

impl ApiConfig {
    /// Verify that the api config is valid
    pub fn verify(&self) -> anyhow::Result<()> {
        ensure!(self.port != 0, "Api port must be non-zero");
        Ok(())
    }
}
