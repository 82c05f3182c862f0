//! Object-store client for crdkv.
//!
//! The backing store is a Kubernetes-style API server: it holds arbitrary
//! custom-typed JSON objects addressable by (namespace, name), creates them
//! atomically and applies merge-patches atomically, one object at a time.
//!
//! # Backends
//!
//! All backends implement the [`ObjectClient`] trait:
//!
//! - [`HttpObjectClient`] -- REST calls to a live API server
//! - [`InMemoryObjectClient`] -- map-based store for tests and embedding
//!
//! # Errors
//!
//! Backend responses are classified exactly once, into [`ClientError`], whose
//! [`kind`](ClientError::kind) is one of the closed [`ErrorKind`] variants.
//! Callers branch on the kind, never on message text.
//!
//! # Modules
//!
//! - [`resource`] -- kind derivation and REST paths
//! - [`merge`] -- RFC 7396 merge-patch
//! - [`config`] -- connection settings

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod merge;
pub mod resource;
pub mod traits;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorKind, Operation};
pub use http::HttpObjectClient;
pub use memory::InMemoryObjectClient;
pub use merge::merge_patch;
pub use resource::{ObjectRef, ResourceKind, SchemaDefinition};
pub use traits::ObjectClient;
