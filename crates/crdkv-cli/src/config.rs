use std::path::Path;

use anyhow::Context;
use crdkv_client::ClientConfig;
use crdkv_store::StorageConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Everything the CLI needs to reach a store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub storage: StorageConfig,
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config file (if any) with command-line overrides applied.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.client.server = server.clone();
        }
        if let Some(namespace) = &cli.namespace {
            self.storage.document.namespace = namespace.clone();
        }
        if let Some(document) = &cli.document {
            self.storage.document.name = document.clone();
        }
    }
}
