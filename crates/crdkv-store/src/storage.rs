//! [`Storage`]: the key-value store kept in one custom resource document.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use crdkv_client::{ObjectClient, ObjectRef, ResourceKind, SchemaDefinition};
use tracing::debug;

use crate::config::StorageConfig;
use crate::document::{DataPatch, Document, DocumentData};
use crate::error::{BootStep, StorageError, StorageResult};
use crate::prefix::{scan, KeyValue};
use crate::registrar::SchemaRegistrar;
use crate::traits::KeyValueStore;

/// A hierarchical key-value store backed by a single document.
///
/// Construction only validates configuration; call [`boot`](Storage::boot)
/// before any read or write. Every operation is one request (reads fetch
/// the whole document), nothing is cached, and all consistency comes from
/// the backend applying each patch atomically. Concurrent writes to the
/// same key are last-writer-wins.
pub struct Storage {
    client: Arc<dyn ObjectClient>,
    registrar: SchemaRegistrar,
    schema: SchemaDefinition,
    document: ObjectRef,
}

impl Storage {
    /// Create an unbooted store. No request is made.
    pub fn new(client: Arc<dyn ObjectClient>, config: StorageConfig) -> StorageResult<Self> {
        if config.schema.name.is_empty() {
            return Err(StorageError::Config("schema.name is empty".into()));
        }
        if config.schema.version.is_empty() {
            return Err(StorageError::Config("schema.version is empty".into()));
        }
        if config.document.name.is_empty() {
            return Err(StorageError::Config("document.name is empty".into()));
        }
        let namespace = if config.document.namespace.is_empty() {
            "default".to_string()
        } else {
            config.document.namespace.clone()
        };

        let kind = ResourceKind::from_schema_name(&config.schema.name, &config.schema.version)
            .map_err(|e| StorageError::Config(e.to_string()))?;
        let schema = SchemaDefinition::new(kind.clone(), config.schema.description.clone());
        let document = ObjectRef::new(kind, namespace, config.document.name.clone());
        let registrar = SchemaRegistrar::new(
            client.clone(),
            config.schema_poll_interval(),
            config.schema_ready_timeout(),
        );

        Ok(Self {
            client,
            registrar,
            schema,
            document,
        })
    }

    /// Address of the backing document.
    pub fn document(&self) -> &ObjectRef {
        &self.document
    }

    /// Ensure the schema, namespace and document exist.
    ///
    /// Each step treats "already exists" as success, so boot can be repeated
    /// and can race other instances sharing the same document; an existing
    /// document is reused with its data intact. Any other failure aborts
    /// boot and names the step.
    pub async fn boot(&self) -> StorageResult<()> {
        self.registrar.ensure(&self.schema).await?;

        let namespace = &self.document.namespace;
        match self.client.create_namespace(namespace).await {
            Ok(()) => debug!(namespace = %namespace, "namespace created"),
            Err(e) if e.is_already_exists() => {
                debug!(namespace = %namespace, "namespace already exists")
            }
            Err(source) => {
                return Err(StorageError::Boot {
                    step: BootStep::Namespace,
                    source,
                });
            }
        }

        let body = serde_json::to_value(Document::empty(&self.document)).map_err(|e| {
            StorageError::Serialization {
                operation: "booting",
                key: self.document.name.clone(),
                message: e.to_string(),
            }
        })?;
        match self.client.create_object(&self.document, &body).await {
            Ok(()) => debug!(document = %self.document.path(), "document created"),
            Err(e) if e.is_already_exists() => {
                debug!(document = %self.document.path(), "document already exists")
            }
            Err(source) => {
                return Err(StorageError::Boot {
                    step: BootStep::Document,
                    source,
                });
            }
        }

        Ok(())
    }

    async fn patch(
        &self,
        operation: &'static str,
        key: &str,
        patch: DataPatch<'_>,
    ) -> StorageResult<()> {
        let body = serde_json::to_value(&patch).map_err(|e| StorageError::Serialization {
            operation,
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.client
            .patch_object(&self.document, &body)
            .await
            .map_err(|source| StorageError::Operation {
                operation,
                key: key.to_string(),
                source,
            })
    }

    /// Fetch the document and return its data map.
    async fn data(
        &self,
        operation: &'static str,
        key: &str,
    ) -> StorageResult<HashMap<String, String>> {
        let body = self
            .client
            .get_object(&self.document)
            .await
            .map_err(|source| StorageError::Operation {
                operation,
                key: key.to_string(),
                source,
            })?;
        let document: DocumentData =
            serde_json::from_value(body).map_err(|e| StorageError::Serialization {
                operation,
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(document.data)
    }
}

#[async_trait]
impl KeyValueStore for Storage {
    async fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.patch("putting", key, DataPatch::set(key, value)).await?;
        debug!(key, "put");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let data = self.data("checking existence", key).await?;
        Ok(data.contains_key(key))
    }

    async fn search(&self, key: &str) -> StorageResult<String> {
        let mut data = self.data("searching", key).await?;
        data.remove(key).ok_or_else(|| StorageError::NotFound {
            key: key.to_string(),
        })
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<KeyValue>> {
        let data = self.data("listing", prefix).await?;
        let list = scan(data, prefix);
        debug!(prefix, count = list.len(), "listed");
        Ok(list)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.patch("deleting", key, DataPatch::remove(key)).await?;
        debug!(key, "deleted");
        Ok(())
    }
}
