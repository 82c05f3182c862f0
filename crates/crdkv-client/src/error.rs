//! Error types for object-store operations.

use std::fmt;

use thiserror::Error;

/// The closed set of conditions callers branch on.
///
/// Every [`ClientError`] classifies into exactly one kind. The classification
/// happens once, where the backend's response is decoded, so higher layers
/// never inspect error text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required construction input is missing or malformed.
    Configuration,
    /// The resource being created is already present.
    AlreadyExists,
    /// The addressed resource does not exist.
    NotFound,
    /// Anything else: network failures, unexpected status codes, bad bodies.
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => f.write_str("configuration"),
            Self::AlreadyExists => f.write_str("already-exists"),
            Self::NotFound => f.write_str("not-found"),
            Self::Transport => f.write_str("transport"),
        }
    }
}

/// Object-store calls, used to tag errors and request counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateSchema,
    SchemaReady,
    CreateNamespace,
    CreateObject,
    GetObject,
    PatchObject,
    DeleteObject,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateSchema => "create schema",
            Self::SchemaReady => "check schema",
            Self::CreateNamespace => "create namespace",
            Self::CreateObject => "create object",
            Self::GetObject => "get object",
            Self::PatchObject => "patch object",
            Self::DeleteObject => "delete object",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while talking to the object store.
#[derive(Clone, Debug, Error)]
pub enum ClientError {
    /// The client could not be constructed from its configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Creation target already exists.
    #[error("already exists: {resource}")]
    AlreadyExists { resource: String },

    /// The addressed resource does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The server answered with a status that is neither success nor one of
    /// the recognised conditions above.
    #[error("{operation} {endpoint}: server returned {code}: {message}")]
    Status {
        operation: Operation,
        endpoint: String,
        code: u16,
        message: String,
    },

    /// The request never produced a usable response.
    #[error("{operation} {endpoint}: {message}")]
    Transport {
        operation: Operation,
        endpoint: String,
        message: String,
    },

    /// A request or response body could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Status { .. } | Self::Transport { .. } | Self::Serialization(_) => {
                ErrorKind::Transport
            }
        }
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Convenience type alias for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
