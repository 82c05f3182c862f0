//! In-memory object store for testing and embedding.
//!
//! [`InMemoryObjectClient`] keeps schemas, namespaces and objects in maps
//! behind `RwLock`s and reproduces the API server's observable behavior:
//! creates report `AlreadyExists`, objects need a served schema and their
//! namespace, and patches follow RFC 7396 merge semantics.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ClientError, ClientResult, Operation};
use crate::merge::merge_patch;
use crate::resource::{namespace_path, ObjectRef, ResourceKind, SchemaDefinition};
use crate::traits::ObjectClient;

/// An in-memory implementation of [`ObjectClient`].
///
/// Data is lost when the client is dropped. Share one instance (behind an
/// `Arc`) between several stores to model independent processes talking to
/// the same cluster.
#[derive(Debug, Default)]
pub struct InMemoryObjectClient {
    schemas: RwLock<HashMap<String, SchemaDefinition>>,
    namespaces: RwLock<HashSet<String>>,
    objects: RwLock<HashMap<String, Value>>,
    failures: Mutex<HashMap<Operation, ClientError>>,
    requests: Mutex<HashMap<Operation, usize>>,
    unready_polls: Mutex<usize>,
}

impl InMemoryObjectClient {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: Operation, error: ClientError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(operation, error);
        }
    }

    /// Report registered schemas as not ready for the next `polls` readiness
    /// checks. Objects cannot be created until they are served.
    pub fn delay_schema_ready(&self, polls: usize) {
        if let Ok(mut unready) = self.unready_polls.lock() {
            *unready = polls;
        }
    }

    /// Number of calls made for `operation`, failed ones included.
    pub fn request_count(&self, operation: Operation) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.get(&operation).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Snapshot of a stored object.
    pub fn object(&self, object: &ObjectRef) -> Option<Value> {
        self.objects.read().ok()?.get(&object.path()).cloned()
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.namespaces
            .read()
            .map(|namespaces| namespaces.contains(name))
            .unwrap_or(false)
    }

    pub fn has_schema(&self, kind: &ResourceKind) -> bool {
        self.schemas
            .read()
            .map(|schemas| schemas.contains_key(&kind.definition_name()))
            .unwrap_or(false)
    }

    /// Count the call and surface an injected failure, if any.
    fn begin(&self, operation: Operation) -> ClientResult<()> {
        {
            let mut requests = self.requests.lock().map_err(|_| poisoned(operation))?;
            *requests.entry(operation).or_insert(0) += 1;
        }
        let mut failures = self.failures.lock().map_err(|_| poisoned(operation))?;
        match failures.remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn poisoned(operation: Operation) -> ClientError {
    ClientError::Transport {
        operation,
        endpoint: "memory".into(),
        message: "lock poisoned".into(),
    }
}

#[async_trait]
impl ObjectClient for InMemoryObjectClient {
    async fn create_schema(&self, schema: &SchemaDefinition) -> ClientResult<()> {
        let op = Operation::CreateSchema;
        self.begin(op)?;
        let mut schemas = self.schemas.write().map_err(|_| poisoned(op))?;
        let name = schema.kind.definition_name();
        if schemas.contains_key(&name) {
            return Err(ClientError::AlreadyExists {
                resource: schema.path(),
            });
        }
        schemas.insert(name, schema.clone());
        Ok(())
    }

    async fn schema_ready(&self, kind: &ResourceKind) -> ClientResult<bool> {
        let op = Operation::SchemaReady;
        self.begin(op)?;
        if !self.has_schema(kind) {
            return Ok(false);
        }
        let mut unready = self.unready_polls.lock().map_err(|_| poisoned(op))?;
        if *unready > 0 {
            *unready -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    async fn create_namespace(&self, name: &str) -> ClientResult<()> {
        let op = Operation::CreateNamespace;
        self.begin(op)?;
        let mut namespaces = self.namespaces.write().map_err(|_| poisoned(op))?;
        if !namespaces.insert(name.to_string()) {
            return Err(ClientError::AlreadyExists {
                resource: namespace_path(name),
            });
        }
        Ok(())
    }

    async fn create_object(&self, object: &ObjectRef, body: &Value) -> ClientResult<()> {
        let op = Operation::CreateObject;
        self.begin(op)?;
        let unready = *self.unready_polls.lock().map_err(|_| poisoned(op))?;
        if !self.has_schema(&object.kind) || unready > 0 {
            return Err(ClientError::NotFound {
                resource: object.kind.cluster_path(),
            });
        }
        if !self.has_namespace(&object.namespace) {
            return Err(ClientError::NotFound {
                resource: namespace_path(&object.namespace),
            });
        }

        let path = object.path();
        let mut objects = self.objects.write().map_err(|_| poisoned(op))?;
        if objects.contains_key(&path) {
            return Err(ClientError::AlreadyExists { resource: path });
        }
        objects.insert(path, body.clone());
        Ok(())
    }

    async fn get_object(&self, object: &ObjectRef) -> ClientResult<Value> {
        let op = Operation::GetObject;
        self.begin(op)?;
        let path = object.path();
        let objects = self.objects.read().map_err(|_| poisoned(op))?;
        objects
            .get(&path)
            .cloned()
            .ok_or(ClientError::NotFound { resource: path })
    }

    async fn patch_object(&self, object: &ObjectRef, patch: &Value) -> ClientResult<()> {
        let op = Operation::PatchObject;
        self.begin(op)?;
        let path = object.path();
        let mut objects = self.objects.write().map_err(|_| poisoned(op))?;
        match objects.get_mut(&path) {
            Some(existing) => {
                merge_patch(existing, patch);
                Ok(())
            }
            None => Err(ClientError::NotFound { resource: path }),
        }
    }

    async fn delete_object(&self, object: &ObjectRef) -> ClientResult<()> {
        let op = Operation::DeleteObject;
        self.begin(op)?;
        let path = object.path();
        let mut objects = self.objects.write().map_err(|_| poisoned(op))?;
        match objects.remove(&path) {
            Some(_) => Ok(()),
            None => Err(ClientError::NotFound { resource: path }),
        }
    }
}
