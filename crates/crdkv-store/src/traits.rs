//! The [`KeyValueStore`] trait defining the hierarchical key-value interface.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::prefix::KeyValue;

/// A flat key space read through "/"-separated paths.
///
/// Keys are opaque strings; only [`list`](KeyValueStore::list) gives `/` a
/// meaning. Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set `key` to `value`, creating or overwriting it.
    async fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Whether `key` is present. An empty value counts as present.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Read the value of `key`.
    ///
    /// Fails with [`StorageError::NotFound`](crate::StorageError::NotFound)
    /// if the key is absent.
    async fn search(&self, key: &str) -> StorageResult<String>;

    /// List entries nested under `prefix`, in no particular order.
    ///
    /// Pass `"/"` to list every entry with its full key. Any other prefix
    /// returns entries below `prefix/` with that part stripped.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<KeyValue>>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
