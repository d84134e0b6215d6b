//! Bundle command: emit one SQL script in dependency order
//!
//! Planning only; no warehouse client is involved, so the ambient project
//! stays the symbolic `@default` segment.

use crate::cli::{BundleArgs, GlobalArgs};
use crate::commands::common;
use anyhow::Result;
use bqp_core::plan::{self, DeployPlan};
use bqp_core::project;
use bqp_core::resource::DEFAULT_PROJECT;

pub(crate) async fn execute(args: &BundleArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let root = common::root_path(&config);

    let files = project::scan_sql_files(&root, &args.projects)?;
    let analyzed = common::analyze_files(files)?;
    let deploy_plan = plan::build_plan(analyzed, &root, DEFAULT_PROJECT)?;
    for warning in &deploy_plan.warnings {
        eprintln!("[warn] {warning}");
    }

    print!("{}", render_bundle(&deploy_plan));
    Ok(())
}

/// Concatenate every planned file in topological order, one header comment
/// per file, each statement block terminated with a semicolon.
pub(crate) fn render_bundle(plan: &DeployPlan) -> String {
    let mut out = String::new();
    for node in &plan.nodes {
        for job in &node.jobs {
            out.push_str(&format!("-- {}\n", job.task_name));
            let sql = job.file.sql.trim();
            out.push_str(sql);
            if !sql.ends_with(';') {
                out.push(';');
            }
            out.push_str("\n\n");
        }
    }
    out
}

#[cfg(test)]
#[path = "bundle_test.rs"]
mod tests;
