//! Error types for bqp-sql

use thiserror::Error;

/// SQL parsing errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// S001: The dialect could not parse the input
    #[error("[S001] SQL parse error: {message}")]
    ParseError { message: String },

    /// S002: Empty SQL input
    #[error("[S002] Empty SQL input")]
    EmptySql,
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
