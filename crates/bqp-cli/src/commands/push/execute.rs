//! Deploy executor: one warehouse query job per file
//!
//! Dispatch is on the file name. `view.sql` composes a `CREATE OR REPLACE
//! VIEW` from the file body; every other file is submitted verbatim as a
//! BATCH-priority job and the produced resource is resolved from the job's
//! statement type. A resolved resource equal to the file's owning directory
//! id triggers a push-direction metadata sync against the sibling
//! `metadata.json`.

use crate::commands::common::{format_bytes, format_elapsed};
use anyhow::{anyhow, bail, Result};
use bqp_core::plan::FileJob;
use bqp_core::resource::ResourceId;
use bqp_db::metadata::{sync_metadata, SyncTarget};
use bqp_db::types::{JobMetadata, JobPriority, QueryJobConfig, QueryParam};
use bqp_db::Warehouse;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name carrying a view definition body instead of runnable SQL.
const VIEW_FILE: &str = "view.sql";

/// Shared, read-only context for all deploy tasks of a run.
pub(crate) struct DeployContext {
    pub(crate) warehouse: Arc<dyn Warehouse>,
    pub(crate) dry_run: bool,
    pub(crate) labels: BTreeMap<String, String>,
    pub(crate) params: Vec<QueryParam>,
    pub(crate) maximum_bytes_billed: Option<i64>,
}

/// Deploy a single file; returns the task's success message.
pub(crate) async fn deploy_file(ctx: &DeployContext, job: &FileJob) -> Result<Option<String>> {
    let file_name = job
        .file
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if file_name == VIEW_FILE {
        deploy_view(ctx, job).await
    } else {
        deploy_query(ctx, job).await
    }
}

fn job_config(ctx: &DeployContext, job: &FileJob, query: &str) -> QueryJobConfig {
    let dataset = &job.namespace.dataset;
    let name = job.namespace.name.as_deref().unwrap_or(dataset);
    let mut labels = ctx.labels.clone();
    labels.insert("bqport".to_string(), "true".to_string());
    QueryJobConfig {
        query: query.to_string(),
        dry_run: ctx.dry_run,
        priority: JobPriority::Batch,
        labels,
        job_prefix: Some(format!("bqport-{}_{}-", dataset, name)),
        maximum_bytes_billed: ctx.maximum_bytes_billed,
        params: ctx.params.clone(),
    }
}

fn estimated_message(metadata: &JobMetadata) -> String {
    let bytes = metadata
        .statistics
        .as_ref()
        .and_then(|s| s.total_bytes_processed)
        .unwrap_or(0);
    format!("{} estimated", format_bytes(bytes))
}

fn stats_message(metadata: &JobMetadata) -> Option<String> {
    let stats = metadata.statistics.as_ref()?;
    let bytes = format_bytes(stats.total_bytes_processed.unwrap_or(0));
    let elapsed = stats
        .elapsed()
        .map(format_elapsed)
        .unwrap_or_else(|| "0.0s".to_string());
    Some(format!("{bytes}, {elapsed}"))
}

fn metadata_dir(job: &FileJob) -> PathBuf {
    job.file
        .path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

async fn deploy_view(ctx: &DeployContext, job: &FileJob) -> Result<Option<String>> {
    let namespace = &job.namespace;
    let name = namespace
        .name
        .as_deref()
        .ok_or_else(|| anyhow!("view.sql must live in a resource directory"))?;
    let body = job.file.sql.trim();
    let query = format!(
        "CREATE OR REPLACE VIEW {}.{} AS {}",
        namespace.dataset, name, body
    );

    if ctx.dry_run {
        let metadata = ctx.warehouse.run_query_job(&job_config(ctx, job, &query)).await?;
        if let Some(error) = metadata.error_result {
            bail!("{}", error.message);
        }
        return Ok(Some(estimated_message(&metadata)));
    }

    let exists = ctx
        .warehouse
        .table_exists(&namespace.project, &namespace.dataset, name)
        .await?;
    if exists {
        ctx.warehouse
            .get_table(&namespace.project, &namespace.dataset, name)
            .await?;
    } else {
        ctx.warehouse
            .create_view(&namespace.project, &namespace.dataset, name, body)
            .await?;
    }

    let target = SyncTarget::Table {
        project: namespace.project.clone(),
        dataset: namespace.dataset.clone(),
        name: name.to_string(),
    };
    if let Err(e) = sync_metadata(ctx.warehouse.as_ref(), &target, &metadata_dir(job), true).await
    {
        eprintln!("[warn] metadata sync failed for {}: {}", namespace, e);
    }

    Ok(None)
}

async fn deploy_query(ctx: &DeployContext, job: &FileJob) -> Result<Option<String>> {
    let metadata = ctx
        .warehouse
        .run_query_job(&job_config(ctx, job, &job.file.sql))
        .await?;
    if let Some(error) = &metadata.error_result {
        bail!("{}", error.message);
    }
    if ctx.dry_run {
        return Ok(Some(estimated_message(&metadata)));
    }

    if let Some(target) = resolve_job_resource(ctx, &job.namespace, &metadata).await? {
        if target_qualified(&target) == job.namespace.qualified() {
            if let Err(e) =
                sync_metadata(ctx.warehouse.as_ref(), &target, &metadata_dir(job), true).await
            {
                eprintln!("[warn] metadata sync failed for {}: {}", job.namespace, e);
            }
        }
    }

    Ok(stats_message(&metadata))
}

fn target_qualified(target: &SyncTarget) -> String {
    match target {
        SyncTarget::Dataset { project, dataset } => format!("{project}.{dataset}"),
        SyncTarget::Table {
            project,
            dataset,
            name,
        }
        | SyncTarget::Routine {
            project,
            dataset,
            name,
        } => format!("{project}.{dataset}.{name}"),
    }
}

/// Resolve the resource a completed job produced.
///
/// Dispatch errors (unsupported or unknown statement types) fail the task;
/// metadata-fetch errors after the successful job only warn and resolve to
/// nothing.
async fn resolve_job_resource(
    ctx: &DeployContext,
    namespace: &ResourceId,
    metadata: &JobMetadata,
) -> Result<Option<SyncTarget>> {
    let statement_type = metadata.statement_type.as_deref().unwrap_or_default();
    match statement_type {
        "SCRIPT" => Ok(resolve_script_children(ctx, &metadata.id).await),
        "CREATE_SCHEMA" | "DROP_SCHEMA" | "ALTER_SCHEMA" => {
            match ctx
                .warehouse
                .get_dataset(&namespace.project, &namespace.dataset)
                .await
            {
                Ok(dataset) => Ok(Some(SyncTarget::Dataset {
                    project: dataset.project,
                    dataset: dataset.dataset,
                })),
                Err(e) => {
                    eprintln!("[warn] failed to fetch dataset {}: {}", namespace, e);
                    Ok(None)
                }
            }
        }
        "CREATE_FUNCTION" | "CREATE_TABLE_FUNCTION" | "DROP_FUNCTION" | "CREATE_PROCEDURE"
        | "DROP_PROCEDURE" => {
            let name = namespace
                .name
                .as_deref()
                .ok_or_else(|| anyhow!("routine statement outside a resource directory"))?;
            match ctx
                .warehouse
                .get_routine(&namespace.project, &namespace.dataset, name)
                .await
            {
                Ok(routine) => Ok(Some(SyncTarget::Routine {
                    project: routine.project,
                    dataset: routine.dataset,
                    name: routine.name,
                })),
                Err(e) => {
                    eprintln!("[warn] failed to fetch routine {}: {}", namespace, e);
                    Ok(None)
                }
            }
        }
        "CREATE_TABLE" | "CREATE_VIEW" | "CREATE_MATERIALIZED_VIEW" | "CREATE_TABLE_AS_SELECT"
        | "DROP_TABLE" | "DROP_VIEW" | "DROP_MATERIALIZED_VIEW" | "ALTER_TABLE" | "ALTER_VIEW"
        | "INSERT" | "UPDATE" | "DELETE" | "MERGE" => {
            let name = namespace
                .name
                .as_deref()
                .ok_or_else(|| anyhow!("table statement outside a resource directory"))?;
            match ctx
                .warehouse
                .get_table(&namespace.project, &namespace.dataset, name)
                .await
            {
                Ok(table) => Ok(Some(SyncTarget::Table {
                    project: table.project,
                    dataset: table.dataset,
                    name: table.name,
                })),
                Err(e) => {
                    eprintln!("[warn] failed to fetch table {}: {}", namespace, e);
                    Ok(None)
                }
            }
        }
        "CREATE_ROW_ACCESS_POLICY" | "DROP_ROW_ACCESS_POLICY" | "CREATE_MODEL" | "EXPORT_MODEL" => {
            bail!("statement type not supported: {statement_type}")
        }
        other => bail!(
            "unexpected statement type '{}': statistics: {:?}",
            other,
            metadata.statistics
        ),
    }
}

/// Enumerate a script's children and return the first fetchable DDL target.
/// Missing resources (dropped again by a later child) are skipped.
async fn resolve_script_children(ctx: &DeployContext, parent_job_id: &str) -> Option<SyncTarget> {
    let children = match ctx.warehouse.list_child_jobs(parent_job_id).await {
        Ok(children) => children,
        Err(e) => {
            eprintln!("[warn] failed to list child jobs of {parent_job_id}: {e}");
            return None;
        }
    };

    for child in &children {
        if let Some(routine) = &child.ddl_target_routine {
            match ctx
                .warehouse
                .get_routine(&routine.project, &routine.dataset, &routine.name)
                .await
            {
                Ok(info) => {
                    return Some(SyncTarget::Routine {
                        project: info.project,
                        dataset: info.dataset,
                        name: info.name,
                    });
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => eprintln!("[warn] failed to fetch routine {}: {}", routine.qualified(), e),
            }
        }
        if let Some(table) = &child.ddl_target_table {
            match ctx
                .warehouse
                .get_table(&table.project, &table.dataset, &table.name)
                .await
            {
                Ok(info) => {
                    return Some(SyncTarget::Table {
                        project: info.project,
                        dataset: info.dataset,
                        name: info.name,
                    });
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => eprintln!("[warn] failed to fetch table {}: {}", table.qualified(), e),
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "execute_test.rs"]
mod tests;
