//! Error types for asset storage.

/// Errors that can occur while persisting an image asset.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The HTTP call to the storage service failed.
    #[error("storage request failed: {0}")]
    Http(String),

    /// The storage service refused the upload.
    #[error("storage rejected upload of {path}: {status}: {body}")]
    Rejected {
        /// Object path that was being written.
        path: String,
        /// HTTP status returned.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// An object already exists at the path and overwrite is disabled.
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// A filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object path is not acceptable.
    #[error("invalid object path: {0}")]
    InvalidPath(String),
}
