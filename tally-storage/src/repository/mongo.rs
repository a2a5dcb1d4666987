// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::access::{
    count_pipeline,
    decode_rows,
};
use bson::{
    doc,
    Document,
};
use futures::TryStreamExt;
use mongodb::{
    options::{
        AggregateOptions,
        ReadPreference,
        SelectionCriteria,
    },
    Client,
    Collection,
    Database,
};
use std::time::Duration;
use tally_common::config::MongoConfig;

/// Count repository backed by a MongoDB collection.
///
/// Aggregations carry the query timeout as `maxTimeMS`. Wrap the repository
/// in a [`TimedRepository`](super::TimedRepository) to bound the client side as well.
///
/// Cloning is cheap; every clone shares the driver's connection pool.
#[derive(Clone, Debug)]
pub struct MongoRepository {
    database: Database,
    collection: Collection<Document>,
    query_timeout: Duration,
}

impl MongoRepository {
    /// Connect to the configured server and make sure the primary answers.
    ///
    /// Both steps are bounded by the configured connect timeout.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StorageError> {
        let client = Client::with_options(config.client_options().await?)?;
        let repository = Self::new(&client, config);
        repository.ping().await?;
        log::info!(
            "Connected to mongo database {} (collection {})",
            config.database,
            config.collection
        );
        Ok(repository)
    }

    /// Wrap an existing client without checking that the server is reachable
    pub fn new(client: &Client, config: &MongoConfig) -> Self {
        let database = client.database(&config.database);
        Self {
            collection: database.collection(&config.collection),
            database,
            query_timeout: config.query_timeout,
        }
    }

    /// The collection queries run against
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    async fn run_pipeline(&self, query: &CountQuery) -> Result<Vec<AggregatedRecord>, StorageError> {
        let options = AggregateOptions::builder().max_time(self.query_timeout).build();
        let rows = self
            .collection
            .aggregate(count_pipeline(query), options)
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        decode_rows(rows)
    }
}

#[async_trait]
impl CountRepository for MongoRepository {
    async fn aggregate_counts(&self, query: &CountQuery) -> Result<Vec<AggregatedRecord>, StorageError> {
        log::debug!("Aggregating counts for {:?}", query);
        self.run_pipeline(query).await
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.database
            .run_command(
                doc! { "ping": 1 },
                SelectionCriteria::ReadPreference(ReadPreference::Primary),
            )
            .await?;
        Ok(())
    }
}
