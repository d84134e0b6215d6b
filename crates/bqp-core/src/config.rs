//! Configuration types and parsing for bqport.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Project configuration from bqport.yml.
///
/// Every field has a default so the file is optional; CLI flags override
/// whatever the file provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory containing the SQL source tree
    #[serde(default = "default_root_path")]
    pub root_path: String,

    /// Number of deploy tasks allowed to run concurrently
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Labels attached to every submitted query job
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Upper bound on bytes billed per query job
    #[serde(default)]
    pub maximum_bytes_billed: Option<i64>,

    /// Outgoing warehouse RPCs allowed per minute
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

fn default_root_path() -> String {
    "./bigquery".to_string()
}

fn default_threads() -> usize {
    8
}

fn default_rate_limit() -> u32 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            threads: default_threads(),
            labels: BTreeMap::new(),
            maximum_bytes_billed: None,
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load `bqport.yml` from a directory, falling back to defaults when the
    /// file does not exist.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let path = dir.join("bqport.yml");
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
