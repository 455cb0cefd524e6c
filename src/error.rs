//! Error handling module for the asset resolver
//!
//! Provides centralized error handling with proper error types using thiserror.
//! A name that is valid but matches nothing is not an error: it is reported as
//! `ResolveResult::NotFound`.

use thiserror::Error;

use crate::types::NameRejection;

/// Main error type for the asset resolver
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The requested name was rejected before any filesystem access
    #[error("Invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: NameRejection },

    /// A match whose path cannot be reported as UTF-8 text
    #[error("Resolved path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// Configuration errors (empty roots, bad config file contents)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors (config files, serve streams)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for resolver operations
pub type Result<T> = std::result::Result<T, ResolverError>;

impl ResolverError {
    /// Create an invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: NameRejection) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Rejection reason, if this is an `InvalidName` error
    pub fn rejection(&self) -> Option<NameRejection> {
        match self {
            Self::InvalidName { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
