//! Error types for bqp-db

use thiserror::Error;

/// Warehouse operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// D001: RPC failed (submission, polling, metadata fetch, delete)
    #[error("[D001] Warehouse RPC failed: {message}")]
    Rpc { message: String },

    /// D002: Resource does not exist remotely
    #[error("[D002] Not found: {resource}")]
    NotFound { resource: String },

    /// D003: Not implemented by this backend
    #[error("[D003] Feature not implemented for {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },

    /// D004: The job's statement type is not handled
    #[error("[D004] Statement type not supported: {statement_type}")]
    UnsupportedStatement { statement_type: String },

    /// D005: metadata.json could not be parsed
    #[error("[D005] Invalid metadata file {path}: {message}")]
    InvalidMetadata { path: String, message: String },

    /// D006: IO error
    #[error("[D006] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbError {
    /// Check whether this error means the resource does not exist, the
    /// equivalent of an HTTP 404. Used where fetch-after-DDL races are
    /// expected and swallowed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
