//! Error types for the Teo core library
//!
//! Every marshaling, builder and lifecycle failure is reported to the
//! immediate caller as a recoverable [`Error`]. Nothing in this crate aborts
//! the process on a bad value or a misused builder.

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

use crate::value::ValueKind;

/// Main error type for Teo core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The dynamic tag of a value is not compatible with the requested type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    /// A handle was used after it had been consumed or released
    #[error("Invalid handle: {message}")]
    InvalidHandle {
        message: String,
    },

    /// The schema reference is missing or unusable
    #[error("Schema error: {message}")]
    Schema {
        message: String,
        source_ref: Option<String>,
    },

    /// The builder was already turned into an app
    #[error("App builder has already been consumed")]
    BuilderAlreadyConsumed,

    /// A hook name was registered twice under the reject policy
    #[error("Duplicate registration: {kind} hook '{name}' is already registered")]
    DuplicateRegistration {
        kind: HookKind,
        name: String,
    },

    /// No hook with this name exists in the namespace
    #[error("Hook not found: {kind} hook '{name}'")]
    HookNotFound {
        kind: HookKind,
        name: String,
    },

    /// A hook returned an error or panicked
    #[error("{kind} hook '{name}' failed: {message}")]
    Hook {
        kind: HookKind,
        name: String,
        message: String,
    },

    /// `run` was entered while another `run` owns the dispatcher
    #[error("App is already running")]
    AlreadyRunning,

    /// The run loop has exited and no longer accepts invocations
    #[error("App has stopped")]
    AppStopped,

    /// JSON conversion errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Hook namespaces; names are unique per namespace, not globally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
    /// `Value -> Value`
    Transform,
    /// `Value -> Validity`
    Validator,
    /// `Value -> ()`
    Performer,
}

impl Error {
    /// Build a schema error for the given reference
    pub fn schema(message: impl Into<String>, source_ref: Option<&str>) -> Self {
        Error::Schema {
            message: message.into(),
            source_ref: source_ref.map(str::to_string),
        }
    }

    /// Build a hook failure
    pub fn hook(kind: HookKind, name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Hook {
            kind,
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Transform => write!(f, "transform"),
            HookKind::Validator => write!(f, "validator"),
            HookKind::Performer => write!(f, "performer"),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
