//! Error types for fileshelf.

use thiserror::Error;

/// Common error type for fileshelf.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Malformed or missing caller-supplied argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Upload is empty or larger than the configured maximum.
    #[error("file size {size} is out of range (max {max} bytes)")]
    SizeOutOfRange {
        /// Declared byte length of the upload.
        size: u64,
        /// Configured maximum in bytes.
        max: u64,
    },

    /// Declared content type is not on the allow-list.
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    /// No file record for the given id and owner.
    #[error("file not found")]
    FileNotFound,

    /// The storage backend failed to persist bytes.
    #[error("storage write error: {0}")]
    StorageWrite(String),

    /// The storage backend failed to read bytes back.
    #[error("storage read error: {0}")]
    StorageRead(String),

    /// Invalid configuration detected at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Database error.
    ///
    /// Errors from sqlx are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),
}

impl From<sqlx::Error> for ShelfError {
    fn from(e: sqlx::Error) -> Self {
        ShelfError::Database(e.to_string())
    }
}

/// Result type alias for fileshelf operations.
pub type Result<T> = std::result::Result<T, ShelfError>;
