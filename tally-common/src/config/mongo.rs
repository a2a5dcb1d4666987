// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use anyhow::ensure;
use mongodb::options::ClientOptions;
use std::time::Duration;

/// Settings for the MongoDB store holding the count records
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Connection string. Overridden by the `MONGO_URI` environment variable.
    pub uri: String,
    /// Database holding the records collection
    pub database: String,
    /// Collection of `{key, createdAt, counts}` documents
    pub collection: String,
    /// The application name that the Client will send to the server as part of the handshake.
    pub app_name: Option<String>,
    /// Bounds both the TCP connect and the initial server selection.
    ///
    /// The default value is 10 seconds.
    pub connect_timeout: Duration,
    /// Bounds every aggregation, on the server (`maxTimeMS`) and on the client.
    ///
    /// The default value is 10 seconds.
    pub query_timeout: Duration,
    /// The maximum amount of connections that the Client should allow to be created in a
    /// connection pool for a given server.
    ///
    /// The driver's default is 10.
    pub max_pool_size: Option<u32>,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_owned(),
            database: "getir-case-study".to_owned(),
            collection: "records".to_owned(),
            app_name: Some("tally".to_owned()),
            connect_timeout: Duration::from_secs(10),
            query_timeout: Duration::from_secs(10),
            max_pool_size: None,
        }
    }
}

impl MongoConfig {
    /// Parse the connection string and apply the configured limits on top of it
    pub async fn client_options(&self) -> mongodb::error::Result<ClientOptions> {
        let mut options = ClientOptions::parse(&self.uri).await?;
        options.connect_timeout = Some(self.connect_timeout);
        options.server_selection_timeout = Some(self.connect_timeout);
        if self.app_name.is_some() {
            options.app_name = self.app_name.clone();
        }
        if self.max_pool_size.is_some() {
            options.max_pool_size = self.max_pool_size;
        }
        Ok(options)
    }

    /// Verify that the mongo config is usable
    pub fn verify(&self) -> anyhow::Result<()> {
        ensure!(!self.uri.is_empty(), "Mongo uri must not be empty");
        ensure!(!self.database.is_empty(), "Mongo database name must not be empty");
        ensure!(!self.collection.is_empty(), "Mongo collection name must not be empty");
        ensure!(!self.connect_timeout.is_zero(), "Mongo connect timeout must be non-zero");
        ensure!(!self.query_timeout.is_zero(), "Mongo query timeout must be non-zero");
        Ok(())
    }
}
