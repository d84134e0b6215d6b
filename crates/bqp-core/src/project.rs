//! SQL source tree discovery

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// A SQL file discovered under the source root.
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub path: PathBuf,
    pub sql: String,
}

/// Recursively discover `.sql` files under `root`, optionally restricted to
/// the named top-level project directories (`@default` included literally).
///
/// Results are sorted by path so downstream planning is reproducible.
pub fn scan_sql_files(root: &Path, projects: &[String]) -> CoreResult<Vec<LocalFile>> {
    if !root.is_dir() {
        return Err(CoreError::InvalidPath {
            path: root.display().to_string(),
            reason: "root path is not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in read_dir(root)? {
        let path = entry;
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !projects.is_empty() && !projects.iter().any(|p| p == name) {
            continue;
        }
        collect_sql_recursive(&path, &mut files)?;
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

fn collect_sql_recursive(dir: &Path, files: &mut Vec<LocalFile>) -> CoreResult<()> {
    for path in read_dir(dir)? {
        if path.is_dir() {
            collect_sql_recursive(&path, files)?;
            continue;
        }
        if !path.extension().is_some_and(|e| e == "sql") {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(sql) => files.push(LocalFile { path, sql }),
            Err(e) => {
                log::warn!("Cannot read {}: {}", path.display(), e);
            }
        }
    }
    Ok(())
}

fn read_dir(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })? {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
