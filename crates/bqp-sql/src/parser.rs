//! SQL parser wrapper

use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Statement;
use sqlparser::dialect::BigQueryDialect;
use sqlparser::parser::Parser;

/// SQL parser that wraps sqlparser-rs with the BigQuery dialect
#[derive(Debug, Default)]
pub struct SqlParser;

impl SqlParser {
    /// Create a new parser for GoogleSQL
    pub fn bigquery() -> Self {
        Self
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        Parser::parse_sql(&BigQueryDialect {}, sql).map_err(|e| SqlError::ParseError {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
