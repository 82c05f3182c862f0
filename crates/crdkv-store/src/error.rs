//! Error types for store operations.

use std::fmt;
use std::time::Duration;

use crdkv_client::{ClientError, ErrorKind};
use thiserror::Error;

/// The step of [`Storage::boot`](crate::Storage::boot) that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootStep {
    Schema,
    Namespace,
    Document,
}

impl fmt::Display for BootStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => f.write_str("schema"),
            Self::Namespace => f.write_str("namespace"),
            Self::Document => f.write_str("document"),
        }
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Required configuration is missing or malformed.
    #[error("invalid storage configuration: {0}")]
    Config(String),

    /// The key is not present in the document.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// A boot step failed with something other than "already exists".
    #[error("boot failed creating {step}: {source}")]
    Boot {
        step: BootStep,
        #[source]
        source: ClientError,
    },

    /// A freshly registered schema did not become servable in time.
    #[error("schema {kind} not ready after {waited:?}")]
    SchemaNotReady { kind: String, waited: Duration },

    /// An object-store call failed during a key operation.
    #[error("{operation} key={key}: {source}")]
    Operation {
        operation: &'static str,
        key: String,
        #[source]
        source: ClientError,
    },

    /// The stored document or an outgoing patch could not be (de)serialized.
    #[error("{operation} key={key}: serialization error: {message}")]
    Serialization {
        operation: &'static str,
        key: String,
        message: String,
    },
}

impl StorageError {
    /// Classify this error into the same closed set the client uses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Boot { source, .. } | Self::Operation { source, .. } => source.kind(),
            Self::SchemaNotReady { .. } | Self::Serialization { .. } => ErrorKind::Transport,
        }
    }

    /// Whether the key, or the document holding it, is absent.
    ///
    /// Absence is a normal outcome for reads; check this before treating an
    /// error as a failure.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Convenience type alias for store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
