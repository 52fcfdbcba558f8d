//! # Error Hierarchy
//!
//! Structured error types for the interception pipeline, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Errors fall into three groups:
//!
//! - [`CallFault`]: raised by a wrapped operation itself.
//! - [`InvocationError`]: the failure channel of an [`InvocationOutcome`],
//!   either a wrapped-call fault or a malformed call context.
//! - [`SinkError`] / [`ConfigError`]: ambient failures that never cross
//!   into a call's outcome.
//!
//! [`InvocationOutcome`]: crate::InvocationOutcome

use thiserror::Error;

/// A failure raised by a wrapped operation.
///
/// `kind` names the failure class (e.g. `RuntimeFault`, `NotFound`) and
/// `message` carries the human-readable detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct CallFault {
    /// Failure class name.
    pub kind: String,
    /// Human-readable detail.
    pub message: String,
}

impl CallFault {
    /// Create a fault with an explicit kind.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a generic `RuntimeFault`.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new("RuntimeFault", message)
    }
}

/// The call context does not fit the operation it was built for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// An interceptor required a parameter the operation does not declare.
    #[error("operation '{operation}' has no parameter named '{parameter}'")]
    MissingParameter {
        /// Operation being invoked.
        operation: String,
        /// Parameter the interceptor looked for.
        parameter: String,
    },

    /// The number of supplied arguments differs from the declared parameters.
    #[error("operation '{operation}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// Operation being invoked.
        operation: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },
}

/// Failure channel of an intercepted call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// The wrapped operation ran and failed.
    #[error("wrapped call failed: {0}")]
    WrappedCall(#[from] CallFault),

    /// The call could not be evaluated against its context.
    #[error("malformed call context: {0}")]
    MalformedContext(#[from] ContextError),
}

impl InvocationError {
    /// Short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::WrappedCall(_) => "WRAPPED_CALL_FAILURE",
            Self::MalformedContext(_) => "MALFORMED_CONTEXT",
        }
    }
}

/// A log sink could not accept a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The sink rejected the record.
    #[error("log sink rejected record: {0}")]
    Rejected(String),

    /// The sink panicked while emitting.
    #[error("log sink panicked while emitting")]
    Panicked,
}

/// Errors while loading pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid YAML for [`InterposeConfig`](crate::InterposeConfig).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config parsed but a field is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
