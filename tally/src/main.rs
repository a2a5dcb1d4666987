// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]
//! # Tally
use anyhow::{
    anyhow,
    Context,
};
use std::sync::Arc;
use tally_api::{
    construct_rocket,
    rocket_config,
    QueryService,
};
use tally_common::{
    config::Config,
    metrics::register_metrics,
};
use tally_storage::repository::{
    MongoRepository,
    TimedRepository,
};

fn main() {
    dotenv::dotenv().ok();
    let env = env_logger::Env::new().filter_or("RUST_LOG", "info");
    env_logger::Builder::from_env(env).init();
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Unable to build tokio runtime: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = runtime.block_on(tally()) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn tally() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;
    config.verify().context("Invalid config")?;

    let repository = MongoRepository::connect(&config.mongo)
        .await
        .with_context(|| format!("Unable to connect to database {}", config.mongo.database))?;
    let repository = TimedRepository::new(repository, config.mongo.query_timeout);
    if let Err(e) = register_metrics() {
        log::warn!("Unable to register metrics: {}", e);
    }

    log::info!("Starting listener on {}:{}", config.api.address, config.api.port);
    construct_rocket(QueryService::new(Arc::new(repository)))
        .configure(rocket_config(&config.api))
        .launch()
        .await
        .map_err(|e| anyhow!("Listener failed: {}", e))?;
    log::info!("Tally shut down");
    Ok(())
}
