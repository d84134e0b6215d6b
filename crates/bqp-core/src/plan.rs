//! Deployment planner
//!
//! Ingests discovered SQL files plus their analyses, builds the global
//! dependency relation set, resolves it into a DAG keyed by canonical
//! resource identifier, and groups per-file jobs under their namespaces in
//! a stable, documented order.

use crate::dag::ResourceDag;
use crate::error::CoreResult;
use crate::project::LocalFile;
use crate::resource::{self, ResourceId, ResourceKind};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Coarse classification of a file's statements, driving the
/// intra-directory total order: DDL before DML before plain queries, then
/// file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatementCategory {
    Ddl,
    Dml,
    Query,
}

impl Default for StatementCategory {
    fn default() -> Self {
        StatementCategory::Query
    }
}

/// What a SQL file creates/writes and what it reads, as raw dotted
/// identifiers. Produced by the analyzer; the planner normalizes both sides.
#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    pub destinations: Vec<(String, ResourceKind)>,
    pub references: Vec<String>,
    pub category: StatementCategory,
}

/// A deployable unit: one SQL file with its resolved namespace and
/// normalized dependency/destination sets.
#[derive(Debug, Clone)]
pub struct FileJob {
    pub file: LocalFile,
    pub namespace: ResourceId,
    pub task_name: String,
    pub dependencies: BTreeSet<String>,
    pub destinations: BTreeSet<String>,
    pub category: StatementCategory,
}

/// Ordered list of jobs under one namespace.
#[derive(Debug)]
pub struct PlanNode {
    pub id: String,
    pub jobs: Vec<FileJob>,
}

/// The result of planning: read-only after construction.
#[derive(Debug)]
pub struct DeployPlan {
    /// Full topological order over every DAG node, including namespaces
    /// that carry no files of their own.
    pub order: Vec<String>,
    /// Namespaces with at least one file, in topological order.
    pub nodes: Vec<PlanNode>,
    /// Per planned namespace, its sorted predecessor namespaces.
    pub dependencies_of: BTreeMap<String, Vec<String>>,
    /// Non-fatal observations surfaced to the operator.
    pub warnings: Vec<String>,
}

/// Build the deployment plan for `files`.
///
/// `default_project` is the client's ambient project: it substitutes the
/// `@default` path segment and pads project-less SQL identifiers. The two
/// mechanisms stay separate; SQL identifiers are never searched for
/// `@default`.
pub fn build_plan(
    files: Vec<(LocalFile, FileAnalysis)>,
    root: &Path,
    default_project: &str,
) -> CoreResult<DeployPlan> {
    let mut relations: BTreeSet<(String, Option<String>)> = BTreeSet::new();
    let mut groups: BTreeMap<String, Vec<FileJob>> = BTreeMap::new();

    for (file, analysis) in files {
        let namespace = resource::path_to_id(&file.path, root, default_project)?;
        let ns_key = namespace.qualified();

        let mut destinations: BTreeSet<String> = BTreeSet::new();
        for (ident, kind) in &analysis.destinations {
            let schema_only = *kind == ResourceKind::Schema;
            destinations.insert(resource::normalize_ident(
                ident,
                default_project,
                schema_only,
            )?);
        }

        // References that cannot be qualified are builtin function calls,
        // not resources; they never become edges.
        let mut dependencies: BTreeSet<String> = BTreeSet::new();
        for reference in &analysis.references {
            match resource::normalize_ident(reference, default_project, false) {
                Ok(normalized) => {
                    dependencies.insert(normalized);
                }
                Err(e) => {
                    log::debug!("skipping unqualifiable reference: {e}");
                }
            }
        }
        dependencies.insert(namespace.parent_dataset().qualified());
        dependencies.remove(&ns_key);

        for dest in &destinations {
            relations.insert((dest.clone(), None));
            for dep in &dependencies {
                if dep != dest && !destinations.contains(dep) {
                    relations.insert((dest.clone(), Some(dep.clone())));
                }
            }
        }

        let task_name = task_name_for(&file, root, &namespace);
        groups.entry(ns_key).or_default().push(FileJob {
            file,
            namespace,
            task_name,
            dependencies,
            destinations,
            category: analysis.category,
        });
    }

    for jobs in groups.values_mut() {
        jobs.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.file.path.cmp(&b.file.path))
        });
    }

    let dag = ResourceDag::build(&relations)?;
    let order = dag.topological_order()?;

    let mut warnings = Vec::new();
    for ns in groups.keys() {
        if !dag.contains(ns) {
            warnings.push(format!("{}: no deployment files", ns));
        }
    }

    let mut nodes = Vec::new();
    let mut dependencies_of = BTreeMap::new();
    for ns in &order {
        let Some(jobs) = groups.remove(ns) else {
            continue;
        };
        if !jobs.iter().any(|job| job.destinations.contains(ns)) {
            warnings.push(format!("{}: no DDL file but target directory found", ns));
        }
        dependencies_of.insert(ns.clone(), dag.dependencies(ns));
        nodes.push(PlanNode {
            id: ns.clone(),
            jobs,
        });
    }

    Ok(DeployPlan {
        order,
        nodes,
        dependencies_of,
        warnings,
    })
}

/// Task name: path components relative to the root with the project segment
/// substituted and the `.sql` extension dropped, joined by `/`. The
/// progress reporter folds shared prefixes of these names into a tree.
fn task_name_for(file: &LocalFile, root: &Path, namespace: &ResourceId) -> String {
    let mut segments: Vec<String> = file
        .path
        .strip_prefix(root)
        .unwrap_or(&file.path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if !segments.is_empty() {
        segments[0] = namespace.project.clone();
        if let Some(last) = segments.last_mut() {
            if let Some(stem) = last.strip_suffix(".sql") {
                *last = stem.to_string();
            }
        }
    }
    segments.join("/")
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
