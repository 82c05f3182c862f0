//! Hierarchical key-value storage in a single custom resource.
//!
//! The backend (see [`crdkv_client`]) can only hold one flat string map per
//! object. This crate keeps an entire key space in that map and reads it
//! back through "/"-separated paths, giving a directory-like interface:
//! point get/put/delete, existence checks and prefix listing.
//!
//! # Architecture
//!
//! - **Schema** -- the custom resource kind documents belong to, registered
//!   on boot by [`SchemaRegistrar`].
//! - **Document** -- one object per store, addressed by (namespace, name),
//!   holding all keys in its `data` field.
//! - **Storage** -- translates key operations into a single get or a single
//!   merge-patch of the document.
//!
//! Several processes may share a document. Boot is idempotent, writes to
//! different keys never interfere, and writes to the same key are
//! last-writer-wins.
//!
//! # Modules
//!
//! - [`error`] -- Error types for store operations
//! - [`config`] -- Schema and document identity
//! - [`document`] -- The stored object and its patches
//! - [`prefix`] -- Prefix-scan rules
//! - [`registrar`] -- Idempotent schema registration
//! - [`traits`] -- The [`KeyValueStore`] trait
//! - [`storage`] -- [`Storage`], the document-backed implementation

pub mod config;
pub mod document;
pub mod error;
pub mod prefix;
pub mod registrar;
pub mod storage;
pub mod traits;

pub use config::{DocumentConfig, SchemaConfig, StorageConfig};
pub use error::{BootStep, StorageError, StorageResult};
pub use prefix::KeyValue;
pub use registrar::{Registration, SchemaRegistrar};
pub use storage::Storage;
pub use traits::KeyValueStore;
