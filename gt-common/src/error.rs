//! Common error types for GreenThumb

use thiserror::Error;

/// Common result type for GreenThumb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across GreenThumb crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found
    #[error("{0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("{0}")]
    InvalidInput(String),

    /// Operation conflicts with the current state of a record
    #[error("{0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Not-found error for a record of the given type
    pub fn not_found(kind: &str) -> Self {
        Error::NotFound(format!(
            "The requested {} object could not be found in the database.",
            kind
        ))
    }
}
