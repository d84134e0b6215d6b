//! Named unit of asynchronous work with an observable lifecycle
//!
//! A [`Task`] wraps a name and a boxed work future. Status moves only
//! forward: pending -> running -> success | failed. Completion is signalled
//! through a watch channel so any number of dependents can await it.

use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

/// Result of a task's work: an optional human-readable message on success.
pub type TaskResult = anyhow::Result<Option<String>>;

/// The stored work future.
pub type TaskWork = BoxFuture<'static, TaskResult>;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl TaskStatus {
    /// True once the task can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed)
    }
}

#[derive(Debug)]
struct TaskState {
    status: TaskStatus,
    message: Option<String>,
    error: Option<String>,
}

/// Snapshot of a task for machine-readable reports.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub name: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A named unit of asynchronous work.
pub struct Task {
    name: String,
    work: Mutex<Option<TaskWork>>,
    state: Mutex<TaskState>,
    done: watch::Sender<bool>,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Acquire a mutex lock, recovering from a poisoned state if necessary.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("task mutex poisoned, recovering");
        poisoned.into_inner()
    })
}

impl Task {
    /// Create a pending task holding `work`.
    pub fn new(name: impl Into<String>, work: TaskWork) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            name: name.into(),
            work: Mutex::new(Some(work)),
            state: Mutex::new(TaskState {
                status: TaskStatus::Pending,
                message: None,
                error: None,
            }),
            done,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> TaskStatus {
        lock(&self.state).status
    }

    pub fn message(&self) -> Option<String> {
        lock(&self.state).message.clone()
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    /// True once the task has reached success or failure.
    pub fn done(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn report(&self) -> TaskReport {
        let state = lock(&self.state);
        TaskReport {
            name: self.name.clone(),
            status: state.status,
            message: state.message.clone(),
            error: state.error.clone(),
        }
    }

    /// Execute the stored work.
    ///
    /// Idempotent: the work future is taken exactly once; any later call is
    /// a no-op. Transitions to running, awaits the work, and records either
    /// success with the returned message or failure with the trimmed
    /// rendered error chain, then completes the watch channel.
    pub async fn run(&self) {
        let work = lock(&self.work).take();
        let Some(work) = work else {
            return;
        };

        lock(&self.state).status = TaskStatus::Running;

        let result = work.await;
        {
            let mut state = lock(&self.state);
            match result {
                Ok(message) => {
                    state.status = TaskStatus::Success;
                    state.message = message;
                }
                Err(e) => {
                    state.status = TaskStatus::Failed;
                    state.error = Some(format!("{e:#}").trim().to_string());
                }
            }
        }

        let _ = self.done.send(true);
    }

    /// Resolve once the task reaches a terminal state.
    pub async fn wait(&self) {
        let mut rx = self.done.subscribe();
        if *rx.borrow_and_update() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow_and_update() {
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "task_test.rs"]
mod tests;
