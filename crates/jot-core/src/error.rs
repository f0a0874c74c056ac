//! Error types for jot-core

use thiserror::Error;

/// Result type alias using jot-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in jot-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Document not found
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The store rejected or could not reach the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a live subscription channel.
///
/// Delivered to every listener of a collection, so it has to be `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Subscription unavailable: {0}")]
    Unavailable(String),
}

impl From<&Error> for ChannelError {
    fn from(error: &Error) -> Self {
        Self::Unavailable(error.to_string())
    }
}
