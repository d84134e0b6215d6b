//! Shared utilities for CLI commands

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use bqp_core::plan::FileAnalysis;
use bqp_core::project::LocalFile;
use bqp_core::Config;
use bqp_db::{BigQueryBackend, Throttled, Warehouse};
use bqp_sql::SqlParser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load bqport.yml from the working directory and apply global overrides.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config =
        Config::load_from_dir(Path::new(".")).context("Failed to load configuration")?;
    if let Some(root) = &global.root_path {
        config.root_path = root.display().to_string();
    }
    Ok(config)
}

/// Build the shared warehouse client, rate-limited per configuration.
pub(crate) fn build_warehouse(config: &Config) -> Result<Arc<dyn Warehouse>> {
    let backend =
        BigQueryBackend::connect(None).context("Failed to build the BigQuery client")?;
    Ok(Arc::new(Throttled::new(
        backend,
        config.rate_limit_per_minute,
    )))
}

/// Parse and analyze every discovered file. Parse failures are fatal: an
/// unparseable file cannot be planned.
pub(crate) fn analyze_files(files: Vec<LocalFile>) -> Result<Vec<(LocalFile, FileAnalysis)>> {
    let parser = SqlParser::bigquery();
    files
        .into_iter()
        .map(|file| {
            let statements = parser
                .parse(&file.sql)
                .with_context(|| format!("Failed to parse {}", file.path.display()))?;
            let analysis = bqp_sql::analyze(&statements);
            Ok((file, analysis))
        })
        .collect()
}

/// Resolve the configured root path relative to the working directory.
pub(crate) fn root_path(config: &Config) -> PathBuf {
    PathBuf::from(&config.root_path)
}

/// Human form of a byte count, binary units with one decimal.
pub(crate) fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = bytes.max(0) as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes.max(0))
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Human form of a job duration.
pub(crate) fn format_elapsed(elapsed: chrono::Duration) -> String {
    format!("{:.1}s", elapsed.num_milliseconds() as f64 / 1000.0)
}
