use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A row column could not be decoded into its domain representation.
    #[error("Row decode error: {0}")]
    Decode(String),

    /// An update/delete was attempted on an entity that was never inserted.
    #[error("{0} has no identifier; insert it first")]
    MissingId(&'static str),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
