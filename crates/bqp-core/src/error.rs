//! Error types for bqp-core

use thiserror::Error;

/// Core error type for bqport
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Path cannot be mapped to a resource identifier
    #[error("[E001] Invalid resource path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// E002: SQL identifier is missing a required component
    #[error("[E002] Invalid identifier '{ident}': {reason}")]
    InvalidIdentifier { ident: String, reason: String },

    /// E003: Dependency graph is not a DAG
    #[error("[E003] Circular dependency detected among: {nodes}")]
    CycleDetected { nodes: String },

    /// A predecessor task failed; this task did not run. No code prefix:
    /// the message is surfaced verbatim as the task's error text.
    #[error("suspended: parent failed: {parents}")]
    SuspendedByParent { parents: String },

    /// E005: Configuration file failed to parse
    #[error("[E005] Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// E006: IO error
    #[error("[E006] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E007: IO error with file path context
    #[error("[E007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
