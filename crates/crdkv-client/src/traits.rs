//! The [`ObjectClient`] trait defining the object-store interface.
//!
//! Any backend (a live API server, an in-process map) implements this trait
//! to provide create/get/patch/delete over namespaced JSON objects.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientResult;
use crate::resource::{ObjectRef, ResourceKind, SchemaDefinition};

/// Storage backend for namespaced custom objects.
///
/// Implementations must be thread-safe (`Send + Sync`) and must report
/// conflicts and absences through the dedicated error variants:
///
/// - creating something that already exists fails with
///   [`ClientError::AlreadyExists`](crate::ClientError::AlreadyExists)
/// - reading, patching or deleting an absent object fails with
///   [`ClientError::NotFound`](crate::ClientError::NotFound)
///
/// Each call is a single request; nothing is cached or retried.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Register a custom resource kind.
    async fn create_schema(&self, schema: &SchemaDefinition) -> ClientResult<()>;

    /// Whether objects of `kind` can be served yet.
    ///
    /// A freshly registered kind takes a moment to become usable.
    async fn schema_ready(&self, kind: &ResourceKind) -> ClientResult<bool>;

    /// Create a namespace.
    async fn create_namespace(&self, name: &str) -> ClientResult<()>;

    /// Create `object` with the full JSON `body`.
    async fn create_object(&self, object: &ObjectRef, body: &Value) -> ClientResult<()>;

    /// Fetch the full JSON body of `object`.
    async fn get_object(&self, object: &ObjectRef) -> ClientResult<Value>;

    /// Apply a JSON merge-patch (RFC 7396) to `object`.
    ///
    /// A `null` member removes the corresponding field; it never stores an
    /// empty value.
    async fn patch_object(&self, object: &ObjectRef, patch: &Value) -> ClientResult<()>;

    /// Delete `object`.
    async fn delete_object(&self, object: &ObjectRef) -> ClientResult<()>;
}
