//! Reconciliation planner
//!
//! Lists remote tables, routines and models per local dataset directory,
//! subtracts everything a local path represents, and schedules one deletion
//! task per orphaned remote resource. Deletions are best-effort: a failed
//! delete never fails the run, but each failure is logged and counted.
//!
//! Remote listings require the client's ambient project, so reconciliation
//! covers the dataset directories under `<root>/@default/` only.

use anyhow::Result;
use bqp_core::resource::{self, ResourceKind, DEFAULT_PROJECT};
use bqp_core::task::Task;
use bqp_db::Warehouse;
use futures::FutureExt;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared context for reconciliation planning.
pub(crate) struct ReconcileContext {
    pub(crate) warehouse: Arc<dyn Warehouse>,
    pub(crate) root: PathBuf,
    pub(crate) dry_run: bool,
    pub(crate) force: bool,
}

/// Deletion tasks plus the shared failure counter surfaced after the run.
pub(crate) struct ReconcilePlan {
    pub(crate) tasks: Vec<Arc<Task>>,
    pub(crate) failures: Arc<AtomicUsize>,
}

/// Plan deletion tasks for every orphaned remote resource.
///
/// Prompting happens here, on the TTY, before any task exists; it is
/// skipped under `--force` and under `--dry-run`.
pub(crate) async fn plan_reconcile(ctx: &ReconcileContext) -> Result<ReconcilePlan> {
    let failures = Arc::new(AtomicUsize::new(0));
    let mut tasks = Vec::new();

    let default_dir = ctx.root.join(DEFAULT_PROJECT);
    if !default_dir.is_dir() {
        return Ok(ReconcilePlan { tasks, failures });
    }
    let project = ctx.warehouse.project_id();

    let mut dataset_dirs: Vec<PathBuf> = std::fs::read_dir(&default_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dataset_dirs.sort();

    for dataset_dir in dataset_dirs {
        let Some(dataset) = dataset_dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        // snapshot the remote inventory once per pass
        let mut tables: BTreeMap<String, String> = ctx
            .warehouse
            .list_tables(&project, dataset)
            .await?
            .into_iter()
            .map(|t| (t.qualified(), t.name))
            .collect();
        let mut routines: BTreeMap<String, String> = ctx
            .warehouse
            .list_routines(&project, dataset)
            .await?
            .into_iter()
            .map(|r| (r.qualified(), r.name))
            .collect();
        let mut models: BTreeMap<String, String> = ctx
            .warehouse
            .list_models(&project, dataset)
            .await?
            .into_iter()
            .map(|m| (m.qualified(), m.name))
            .collect();

        // every local path claims its resource
        for file in walk_files(&dataset_dir) {
            let id = match resource::path_to_id(&file, &ctx.root, &project) {
                Ok(id) => id,
                Err(e) => {
                    log::debug!("skipping unmappable path: {e}");
                    continue;
                }
            };
            let key = id.qualified();
            match id.kind {
                ResourceKind::Routine => {
                    routines.remove(&key);
                }
                ResourceKind::Model => {
                    models.remove(&key);
                }
                ResourceKind::Schema => {}
                _ => {
                    tables.remove(&key);
                }
            }
        }

        schedule_kind(ctx, &mut tasks, &failures, &project, dataset, "TABLE", tables);
        schedule_kind(ctx, &mut tasks, &failures, &project, dataset, "ROUTINE", routines);
        schedule_kind(ctx, &mut tasks, &failures, &project, dataset, "MODEL", models);
    }

    Ok(ReconcilePlan { tasks, failures })
}

fn walk_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(walk_files(&path));
        } else {
            files.push(path);
        }
    }
    files
}

fn schedule_kind(
    ctx: &ReconcileContext,
    tasks: &mut Vec<Arc<Task>>,
    failures: &Arc<AtomicUsize>,
    project: &str,
    dataset: &str,
    kind: &'static str,
    residual: BTreeMap<String, String>,
) {
    if residual.is_empty() {
        return;
    }
    if !ctx.force && !ctx.dry_run {
        let ids: Vec<&String> = residual.keys().collect();
        if !confirm_deletion(kind, dataset, &ids) {
            return;
        }
    }

    for (_, name) in residual {
        let task_name = format!("{project}/{dataset}/(DELETE)/{kind}/{name}");
        let warehouse = Arc::clone(&ctx.warehouse);
        let dry_run = ctx.dry_run;
        let failures = Arc::clone(failures);
        let project = project.to_string();
        let dataset = dataset.to_string();

        let work = async move {
            if dry_run {
                return Ok(Some("dry-run".to_string()));
            }
            let result = match kind {
                "TABLE" => warehouse.delete_table(&project, &dataset, &name).await,
                "ROUTINE" => warehouse.delete_routine(&project, &dataset, &name).await,
                _ => warehouse.delete_model(&project, &dataset, &name).await,
            };
            match result {
                Ok(()) => Ok(Some("deleted".to_string())),
                Err(e) => {
                    eprintln!(
                        "[warn] failed to delete {kind} {project}.{dataset}.{name}: {e}"
                    );
                    failures.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            }
        }
        .boxed();

        tasks.push(Arc::new(Task::new(task_name, work)));
    }
}

/// Ask the operator whether the listed resources may be deleted. Any reply
/// beginning with `y` proceeds.
fn confirm_deletion(kind: &str, dataset: &str, ids: &[&String]) -> bool {
    eprintln!("Remote {kind}s in '{dataset}' with no local counterpart:");
    for id in ids {
        eprintln!("  {id}");
    }
    eprint!("Delete them? [y/N] ");
    let _ = std::io::stderr().flush();

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    line.trim_start().to_lowercase().starts_with('y')
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
