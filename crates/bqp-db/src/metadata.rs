//! Bidirectional metadata mirror
//!
//! Every resource directory may carry a `metadata.json` with description,
//! labels and column descriptions. Pull direction writes the remote state to
//! disk; push direction overlays the local file onto the remote state,
//! issues the corresponding warehouse update, and rewrites the file with the
//! merged result.

use crate::error::{DbError, DbResult};
use crate::traits::Warehouse;
use crate::types::ResourceMetadata;
use std::path::Path;

/// File name of the metadata mirror inside a resource directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Which remote resource a sync addresses.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncTarget {
    Dataset {
        project: String,
        dataset: String,
    },
    Table {
        project: String,
        dataset: String,
        name: String,
    },
    Routine {
        project: String,
        dataset: String,
        name: String,
    },
}

async fn fetch(warehouse: &dyn Warehouse, target: &SyncTarget) -> DbResult<ResourceMetadata> {
    match target {
        SyncTarget::Dataset { project, dataset } => {
            Ok(warehouse.get_dataset(project, dataset).await?.metadata)
        }
        SyncTarget::Table {
            project,
            dataset,
            name,
        } => Ok(warehouse.get_table(project, dataset, name).await?.metadata),
        SyncTarget::Routine {
            project,
            dataset,
            name,
        } => Ok(warehouse.get_routine(project, dataset, name).await?.metadata),
    }
}

async fn update(
    warehouse: &dyn Warehouse,
    target: &SyncTarget,
    metadata: &ResourceMetadata,
) -> DbResult<()> {
    match target {
        SyncTarget::Dataset { project, dataset } => {
            warehouse
                .update_dataset_metadata(project, dataset, metadata)
                .await
        }
        SyncTarget::Table {
            project,
            dataset,
            name,
        } => {
            warehouse
                .update_table_metadata(project, dataset, name, metadata)
                .await
        }
        SyncTarget::Routine {
            project,
            dataset,
            name,
        } => {
            warehouse
                .update_routine_metadata(project, dataset, name, metadata)
                .await
        }
    }
}

fn read_local(path: &Path) -> DbResult<Option<ResourceMetadata>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let metadata =
        serde_json::from_str(&content).map_err(|e| DbError::InvalidMetadata {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(Some(metadata))
}

/// Local fields win; untouched remote fields survive.
fn overlay(remote: &ResourceMetadata, local: &ResourceMetadata) -> ResourceMetadata {
    let mut labels = remote.labels.clone();
    labels.extend(local.labels.clone());
    ResourceMetadata {
        description: local.description.clone().or_else(|| remote.description.clone()),
        labels,
        columns: if local.columns.is_empty() {
            remote.columns.clone()
        } else {
            local.columns.clone()
        },
    }
}

/// Mirror metadata between `dir/metadata.json` and the remote resource.
pub async fn sync_metadata(
    warehouse: &dyn Warehouse,
    target: &SyncTarget,
    dir: &Path,
    push: bool,
) -> DbResult<()> {
    let remote = fetch(warehouse, target).await?;
    let path = dir.join(METADATA_FILE);

    let merged = match (push, read_local(&path)?) {
        (true, Some(local)) => {
            let merged = overlay(&remote, &local);
            update(warehouse, target, &merged).await?;
            merged
        }
        _ => remote,
    };

    std::fs::create_dir_all(dir)?;
    let mut rendered = serde_json::to_string_pretty(&merged)?;
    rendered.push('\n');
    std::fs::write(&path, rendered)?;
    Ok(())
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
