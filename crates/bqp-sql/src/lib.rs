//! bqp-sql - SQL parsing layer for bqport
//!
//! This crate wraps sqlparser-rs with the BigQuery dialect and provides the
//! analyzer that classifies what each SQL file creates or writes
//! (destinations) and what it reads (references), with CTE-local names
//! suppressed.

pub mod analyzer;
pub mod error;
pub mod parser;

pub use analyzer::analyze;
pub use error::{SqlError, SqlResult};
pub use parser::SqlParser;
pub use sqlparser::ast::Statement;

/// Convert a sqlparser `ObjectName` to a dot-separated string.
pub(crate) fn object_name_to_string(name: &sqlparser::ast::ObjectName) -> String {
    name.0
        .iter()
        .map(|part| part.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
