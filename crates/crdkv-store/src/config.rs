//! Configuration for [`Storage`](crate::Storage).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identity of the custom resource kind documents are stored as.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Dotted `<resource>.<group>` name.
    pub name: String,
    pub version: String,
    /// May be empty.
    pub description: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            name: "tpr-storage.giantswarm.io".into(),
            version: "v1".into(),
            description: "Storage data managed by crdkv".into(),
        }
    }
}

/// The document holding the key space.
///
/// It is created on boot when missing and reused otherwise, so several
/// stores may safely share one document.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocumentConfig {
    /// Required.
    pub name: String,
    /// An empty namespace resolves to `default`.
    pub namespace: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            namespace: "giantswarm".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub schema: SchemaConfig,
    pub document: DocumentConfig,
    /// How long boot waits for a newly registered schema to be served.
    pub schema_ready_timeout_secs: u64,
    pub schema_poll_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            schema: SchemaConfig::default(),
            document: DocumentConfig::default(),
            schema_ready_timeout_secs: 30,
            schema_poll_interval_ms: 500,
        }
    }
}

impl StorageConfig {
    /// Default settings for the document `name`.
    pub fn for_document(name: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.document.name = name.into();
        config
    }

    pub fn schema_ready_timeout(&self) -> Duration {
        Duration::from_secs(self.schema_ready_timeout_secs)
    }

    pub fn schema_poll_interval(&self) -> Duration {
        Duration::from_millis(self.schema_poll_interval_ms)
    }
}
