//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors with additional context about which operation failed.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A row referenced by the operation does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A stored value could not be mapped onto a domain type.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
