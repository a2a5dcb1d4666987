// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
pub use api::*;
pub use mongo::*;
use std::path::Path;

mod api;
mod mongo;

/// Default location of the configuration file
pub const CONFIG_PATH: &str = "./config.ron";

/// Top level configuration of the Tally application
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Config {
    /// Document store settings
    pub mongo: MongoConfig,
    /// HTTP listener settings
    pub api: ApiConfig,
}

impl Config {
    /// Load the configuration from `CONFIG_PATH` (env) or `./config.ron`.
    ///
    /// A missing file is created from the default configuration.
    pub fn load() -> anyhow::Result<Config> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| CONFIG_PATH.to_string());
        let mut config = Self::load_from(Path::new(&path))?;
        if let Ok(uri) = std::env::var("MONGO_URI") {
            config.mongo.uri = uri;
        }
        Ok(config)
    }

    /// Load the configuration from the given path, writing the default there if nothing exists
    pub fn load_from(path: &Path) -> anyhow::Result<Config> {
        match std::fs::File::open(path) {
            Ok(f) => ron::de::from_reader(f).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e)),
            Err(e) => match e.kind() {
                std::io::ErrorKind::NotFound => {
                    log::warn!("No config found at {}, writing the default one", path.display());
                    let config = Self::default();
                    config.save_to(path)?;
                    Ok(config)
                }
                _ => Err(e.into()),
            },
        }
    }

    /// Save the configuration as pretty RON
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let f = std::fs::File::create(path)?;
        ron::ser::to_writer_pretty(f, self, ron::ser::PrettyConfig::default())?;
        Ok(())
    }

    /// Verify every section of the configuration
    pub fn verify(&self) -> anyhow::Result<()> {
        self.mongo.verify()?;
        self.api.verify()?;
        Ok(())
    }
}
