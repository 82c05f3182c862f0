//! Idempotent registration of the document's resource kind.

use std::sync::Arc;
use std::time::Duration;

use crdkv_client::{ClientError, ObjectClient, SchemaDefinition};
use tracing::debug;

use crate::error::{BootStep, StorageError, StorageResult};

/// What [`SchemaRegistrar::ensure`] found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyExisted,
}

/// Makes sure a resource kind is registered before documents use it.
pub struct SchemaRegistrar {
    client: Arc<dyn ObjectClient>,
    poll_interval: Duration,
    ready_timeout: Duration,
}

impl SchemaRegistrar {
    pub fn new(
        client: Arc<dyn ObjectClient>,
        poll_interval: Duration,
        ready_timeout: Duration,
    ) -> Self {
        Self {
            client,
            poll_interval,
            ready_timeout,
        }
    }

    /// Register `schema`, treating "already exists" as success.
    ///
    /// Either way it then waits until the backend serves the kind: a kind
    /// registered moments ago by another instance may not be served yet. An
    /// already served kind costs one readiness check.
    pub async fn ensure(&self, schema: &SchemaDefinition) -> StorageResult<Registration> {
        let name = schema.kind.definition_name();
        let registration = match self.client.create_schema(schema).await {
            Ok(()) => {
                debug!(schema = %name, "schema created");
                Registration::Created
            }
            Err(e) if e.is_already_exists() => {
                debug!(schema = %name, "schema already exists");
                Registration::AlreadyExisted
            }
            Err(source) => {
                return Err(StorageError::Boot {
                    step: BootStep::Schema,
                    source,
                });
            }
        };
        self.wait_ready(schema).await?;
        Ok(registration)
    }

    async fn wait_ready(&self, schema: &SchemaDefinition) -> StorageResult<()> {
        let poll = async {
            loop {
                if self.client.schema_ready(&schema.kind).await? {
                    return Ok::<(), ClientError>(());
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        match tokio::time::timeout(self.ready_timeout, poll).await {
            Ok(Ok(())) => {
                debug!(schema = %schema.kind.definition_name(), "schema ready");
                Ok(())
            }
            Ok(Err(source)) => Err(StorageError::Boot {
                step: BootStep::Schema,
                source,
            }),
            Err(_) => Err(StorageError::SchemaNotReady {
                kind: schema.kind.definition_name(),
                waited: self.ready_timeout,
            }),
        }
    }
}
