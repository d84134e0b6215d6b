//! CLI argument definitions using clap derive API

use bqp_db::types::{ParamValue, QueryParam};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// bqport - deploy a tree of SQL files to BigQuery
#[derive(Parser, Debug)]
#[command(name = "bqport")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the SQL source tree root (default from bqport.yml)
    #[arg(long = "root-path", global = true)]
    pub root_path: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy local SQL files to the warehouse
    Push(PushArgs),

    /// Emit a concatenated SQL script in dependency order
    Bundle(BundleArgs),
}

/// Output formats for the push command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Live tree rendering on the terminal (default)
    #[default]
    Console,
    /// Machine-readable JSON report
    Json,
}

/// Arguments for the push command
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Project directories to deploy (default: all)
    pub projects: Vec<String>,

    /// Maximum concurrent deploy tasks
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "console")]
    pub format: OutputFormat,

    /// Delete orphaned remote resources without prompting
    #[arg(long)]
    pub force: bool,

    /// Estimate cost without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Label attached to submitted jobs (key:value, repeatable)
    #[arg(long = "label", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,

    /// Query parameter as name:type:value; empty name means positional
    /// (repeatable)
    #[arg(long = "parameter", value_parser = parse_parameter)]
    pub parameters: Vec<QueryParam>,

    /// Upper bound on bytes billed per job
    #[arg(long = "maximum_bytes_billed")]
    pub maximum_bytes_billed: Option<i64>,
}

/// Arguments for the bundle command
#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Project directories to include (default: all)
    pub projects: Vec<String>,
}

/// Parse a `key:value` label argument.
fn parse_label(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key:value, got '{raw}'")),
    }
}

/// Parse a `name:type:value` parameter argument.
///
/// An empty name makes the parameter positional. A type of `integers`
/// parses the value as an integer; anything else is a string. The literal
/// value `NULL` becomes a null parameter.
fn parse_parameter(raw: &str) -> Result<QueryParam, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(name), Some(kind), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected name:type:value, got '{raw}'"));
    };

    let name = if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    };

    let value = if value == "NULL" {
        ParamValue::Null
    } else if kind == "integers" {
        ParamValue::Int(
            value
                .parse()
                .map_err(|e| format!("invalid integer '{value}': {e}"))?,
        )
    } else {
        ParamValue::String(value.to_string())
    };

    Ok(QueryParam { name, value })
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
