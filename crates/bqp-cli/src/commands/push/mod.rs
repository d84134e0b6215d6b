//! Push command: scan, plan, execute, reconcile
//!
//! Planner errors (invalid paths, cycles) abort the run with a non-zero
//! exit; individual task failures are reported but do not affect the exit
//! status.

pub(crate) mod execute;
pub(crate) mod reconcile;

use crate::cli::{GlobalArgs, OutputFormat, PushArgs};
use crate::commands::common;
use crate::reporter;
use anyhow::Result;
use bqp_core::plan::{self, FileJob};
use bqp_core::project;
use bqp_core::schedule::{self, JobRunner};
use bqp_core::task::TaskStatus;
use bqp_core::Config;
use bqp_db::Warehouse;
use futures::FutureExt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) async fn execute(args: &PushArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let warehouse = common::build_warehouse(&config)?;
    run_push(args, &config, warehouse).await
}

/// Deploy the tree and reconcile remote state against it.
pub(crate) async fn run_push(
    args: &PushArgs,
    config: &Config,
    warehouse: Arc<dyn Warehouse>,
) -> Result<()> {
    let root = common::root_path(config);
    let default_project = warehouse.project_id();

    let files = project::scan_sql_files(&root, &args.projects)?;
    let analyzed = common::analyze_files(files)?;
    let deploy_plan = plan::build_plan(analyzed, &root, &default_project)?;
    for warning in &deploy_plan.warnings {
        eprintln!("[warn] {warning}");
    }

    let mut labels = config.labels.clone();
    labels.extend(args.labels.iter().cloned());
    let ctx = Arc::new(execute::DeployContext {
        warehouse: Arc::clone(&warehouse),
        dry_run: args.dry_run,
        labels,
        params: args.parameters.clone(),
        maximum_bytes_billed: args.maximum_bytes_billed.or(config.maximum_bytes_billed),
    });

    let runner: Arc<JobRunner> = {
        let ctx = Arc::clone(&ctx);
        Arc::new(move |job: FileJob| {
            let ctx = Arc::clone(&ctx);
            async move { execute::deploy_file(&ctx, &job).await }.boxed()
        })
    };

    let nodes = schedule::build_schedule(deploy_plan, runner);
    let mut tasks = schedule::all_tasks(&nodes);

    // the operator prompt runs here, before any task exists
    let reconcile_ctx = reconcile::ReconcileContext {
        warehouse: Arc::clone(&warehouse),
        root,
        dry_run: args.dry_run,
        force: args.force,
    };
    let reconcile_plan = reconcile::plan_reconcile(&reconcile_ctx).await?;
    tasks.extend(reconcile_plan.tasks.iter().cloned());

    let threads = args.threads.unwrap_or(config.threads);
    match args.format {
        OutputFormat::Console => {
            let live = tokio::spawn(reporter::live_report(tasks.clone()));
            schedule::run_tasks(&tasks, threads).await;
            let _ = live.await;
        }
        OutputFormat::Json => {
            schedule::run_tasks(&tasks, threads).await;
            let reports: Vec<_> = tasks.iter().map(|t| t.report()).collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    let failed = tasks
        .iter()
        .filter(|t| t.status() == TaskStatus::Failed)
        .count();
    let deletion_failures = reconcile_plan.failures.load(Ordering::SeqCst);
    if deletion_failures > 0 {
        eprintln!("[warn] {deletion_failures} deletion(s) failed");
    }
    eprintln!("{} succeeded, {} failed", tasks.len() - failed, failed);
    Ok(())
}

#[cfg(test)]
#[path = "push_test.rs"]
mod tests;
