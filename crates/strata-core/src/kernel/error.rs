//! # Strata Kernel Errors
//!
//! Defines the crate-wide [`Error`] enum and the [`Result`] alias.
//!
//! Subsystem errors ([`AccessError`], [`ConfigError`]) convert into it with
//! `?`. Every variant is surfaced to the caller that triggered the
//! resolution or construction; nothing is swallowed or retried.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::access::error::AccessError;
use crate::config::error::ConfigError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// A dependency declaration broke the layer or visibility policy.
    #[error("Access control violation: {0}")]
    Access(#[from] AccessError),

    /// Kernel configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A type was reached again while it was still being constructed.
    #[error("Circular dependency detected: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<&'static str> },

    /// A context component was resolved on a kernel that never bound it.
    #[error("Context '{context}' has no value bound on this kernel. Bind it with `Kernel::context` on a scoped kernel")]
    ContextNotBound { context: &'static str },

    /// An invoke-scoped key was resolved on a root kernel while the
    /// configuration rejects that.
    #[error("Invoke-scoped component '{component}' was resolved on a root kernel; resolve it on a `scoped()` kernel")]
    RootInvokeRejected { component: &'static str },

    /// An erased instance did not hold the expected type.
    #[error("Resolved value for '{key}' is not a '{expected}'")]
    TypeMismatch { key: &'static str, expected: &'static str },

    /// A component's own constructor failed.
    #[error("Failed to construct '{component}': {message}")]
    Construction { component: &'static str, message: String },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    /// Helper for components reporting their own construction failures.
    pub fn construction(component: &'static str, message: impl Into<String>) -> Self {
        Error::Construction {
            component,
            message: message.into(),
        }
    }

    /// Whether this error came from the access-control policy.
    pub fn is_access_violation(&self) -> bool {
        matches!(self, Error::Access(_))
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
