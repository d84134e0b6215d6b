//! Task wiring and bounded execution
//!
//! Turns a [`DeployPlan`](crate::plan::DeployPlan) into dependency-aware
//! tasks. Ordering is enforced inside each task's work future, not by the
//! scheduler: a task first awaits every task of every dependency node and
//! every earlier task of its own node, and suspends without invoking the
//! runner if any of them failed.

use crate::error::CoreError;
use crate::plan::{DeployPlan, FileJob};
use crate::task::{Task, TaskStatus};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Tasks of one namespace, in planner insertion order.
pub struct DagNode {
    pub id: String,
    pub tasks: Vec<Arc<Task>>,
}

/// The deploy work performed for one file once all predecessors succeeded.
pub type JobRunner =
    dyn Fn(FileJob) -> BoxFuture<'static, anyhow::Result<Option<String>>> + Send + Sync;

/// Create one task per planned file, wired to its predecessors.
///
/// Nodes come out in the plan's topological order; dependency namespaces
/// without files of their own impose no waits.
pub fn build_schedule(plan: DeployPlan, runner: Arc<JobRunner>) -> Vec<DagNode> {
    let DeployPlan {
        nodes: plan_nodes,
        dependencies_of,
        ..
    } = plan;

    let mut nodes: Vec<DagNode> = Vec::with_capacity(plan_nodes.len());
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for plan_node in plan_nodes {
        let dep_tasks: Vec<Arc<Task>> = dependencies_of
            .get(&plan_node.id)
            .map(|deps| {
                deps.iter()
                    .filter_map(|dep| index_of.get(dep))
                    .flat_map(|&i| nodes[i].tasks.iter().cloned())
                    .collect()
            })
            .unwrap_or_default();

        let mut tasks: Vec<Arc<Task>> = Vec::with_capacity(plan_node.jobs.len());
        for job in plan_node.jobs {
            let mut predecessors = dep_tasks.clone();
            predecessors.extend(tasks.iter().cloned());

            let runner = Arc::clone(&runner);
            let name = job.task_name.clone();
            let work = async move {
                let mut failed: Vec<String> = Vec::new();
                for predecessor in &predecessors {
                    predecessor.wait().await;
                    if predecessor.status() == TaskStatus::Failed {
                        failed.push(predecessor.name().to_string());
                    }
                }
                if !failed.is_empty() {
                    return Err(CoreError::SuspendedByParent {
                        parents: failed.join(", "),
                    }
                    .into());
                }
                runner(job).await
            }
            .boxed();

            tasks.push(Arc::new(Task::new(name, work)));
        }

        index_of.insert(plan_node.id.clone(), nodes.len());
        nodes.push(DagNode {
            id: plan_node.id,
            tasks,
        });
    }

    nodes
}

/// Flatten the schedule into its task list, preserving topological order.
pub fn all_tasks(nodes: &[DagNode]) -> Vec<Arc<Task>> {
    nodes.iter().flat_map(|n| n.tasks.iter().cloned()).collect()
}

/// Run every task through a bounded worker pool.
///
/// Permits are acquired in the submission loop, so they are granted
/// strictly in topological order: a dependent can never hold the last
/// permit while its own predecessor waits for one.
pub async fn run_tasks(tasks: &[Arc<Task>], concurrency: usize) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut set = JoinSet::new();

    for task in tasks {
        // a closed semaphore means shutdown
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let task = Arc::clone(task);
        set.spawn(async move {
            task.run().await;
            drop(permit);
        });
    }

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            log::warn!("task join error: {e}");
        }
    }
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
