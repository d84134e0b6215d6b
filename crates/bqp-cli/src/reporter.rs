//! Live tree rendering of task progress
//!
//! Task names split on `/`; shared prefixes fold into group lines. The
//! renderer only reads task state: pending tasks are invisible, running
//! tasks show a spinner frame, finished tasks a check or cross glyph.

use bqp_core::task::{Task, TaskStatus};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

#[cfg(not(windows))]
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
#[cfg(windows)]
const SPINNER_FRAMES: &[&str] = &["-", "\\", "|", "/"];

#[cfg(not(windows))]
const CHECK: &str = "✔";
#[cfg(windows)]
const CHECK: &str = "√";

#[cfg(not(windows))]
const CROSS: &str = "✖";
#[cfg(windows)]
const CROSS: &str = "×";

struct TreeNode {
    label: String,
    task: Option<Arc<Task>>,
    children: Vec<TreeNode>,
}

fn insert(nodes: &mut Vec<TreeNode>, segments: &[&str], task: &Arc<Task>) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        nodes.push(TreeNode {
            label: (*first).to_string(),
            task: Some(Arc::clone(task)),
            children: Vec::new(),
        });
        return;
    }
    if let Some(group) = nodes
        .iter_mut()
        .find(|n| n.task.is_none() && n.label == *first)
    {
        insert(&mut group.children, rest, task);
        return;
    }
    let mut group = TreeNode {
        label: (*first).to_string(),
        task: None,
        children: Vec::new(),
    };
    insert(&mut group.children, rest, task);
    nodes.push(group);
}

fn build_tree(tasks: &[Arc<Task>]) -> Vec<TreeNode> {
    let mut roots = Vec::new();
    for task in tasks {
        let segments: Vec<&str> = task.name().split('/').collect();
        insert(&mut roots, &segments, task);
    }
    roots
}

fn visible(node: &TreeNode) -> bool {
    match &node.task {
        Some(task) => task.status() != TaskStatus::Pending,
        None => node.children.iter().any(visible),
    }
}

fn render_node(node: &TreeNode, depth: usize, tick: usize, out: &mut String) {
    if !visible(node) {
        return;
    }
    let indent = "  ".repeat(depth);
    let Some(task) = &node.task else {
        out.push_str(&format!("{indent}{}/\n", node.label));
        for child in &node.children {
            render_node(child, depth + 1, tick, out);
        }
        return;
    };
    match task.status() {
        TaskStatus::Pending => {}
        TaskStatus::Running => {
            let frame = SPINNER_FRAMES[tick % SPINNER_FRAMES.len()];
            out.push_str(&format!("{indent}{frame} {}\n", node.label));
        }
        TaskStatus::Success => match task.message() {
            Some(message) => {
                out.push_str(&format!("{indent}{CHECK} {} ({message})\n", node.label));
            }
            None => out.push_str(&format!("{indent}{CHECK} {}\n", node.label)),
        },
        TaskStatus::Failed => {
            out.push_str(&format!("{indent}{CROSS} {}\n", node.label));
            let error = task.error().unwrap_or_default();
            out.push_str(&format!("{indent}    {error}\n"));
        }
    }
}

/// Render one frame of the task tree. Pure: derives everything from task
/// state and the spinner tick.
pub(crate) fn render(tasks: &[Arc<Task>], tick: usize) -> String {
    let mut out = String::new();
    for node in build_tree(tasks) {
        render_node(&node, 0, tick, &mut out);
    }
    out
}

/// Repaint the tree roughly every 100 ms until every task is done.
pub(crate) async fn live_report(tasks: Vec<Arc<Task>>) {
    let mut tick = 0usize;
    let mut last_lines = 0usize;
    loop {
        let frame = render(&tasks, tick);
        {
            let mut stdout = std::io::stdout().lock();
            if last_lines > 0 {
                let _ = write!(stdout, "\x1b[{last_lines}A\x1b[0J");
            }
            let _ = write!(stdout, "{frame}");
            let _ = stdout.flush();
        }
        last_lines = frame.lines().count();
        if tasks.iter().all(|t| t.done()) {
            break;
        }
        tick += 1;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[cfg(test)]
#[path = "reporter_test.rs"]
mod tests;
