//! Dependency DAG over resource identifiers with deterministic ordering

use crate::error::{CoreError, CoreResult};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

/// A directed acyclic graph of resource dependencies.
///
/// Nodes are canonical identifier strings; an edge `a -> b` means `a` must
/// be deployed before `b`.
#[derive(Debug, Default)]
pub struct ResourceDag {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl ResourceDag {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a node, returning the existing index if already present.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            idx
        } else {
            let idx = self.graph.add_node(id.to_string());
            self.node_map.insert(id.to_string(), idx);
            idx
        }
    }

    /// Add an ordering edge: `from` must reach a terminal state before `to`
    /// may start. Self-loops are ignored.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Build a DAG from the planner's relation set.
    ///
    /// Each `(destination, None)` tuple keeps a destination alive as a node
    /// even when nothing depends on it; each `(destination, Some(dep))`
    /// tuple adds the edge `dep -> destination`. Fails fast on cycles.
    pub fn build(relations: &BTreeSet<(String, Option<String>)>) -> CoreResult<Self> {
        let mut dag = Self::new();
        for (dest, dep) in relations {
            dag.add_node(dest);
            if let Some(dep) = dep {
                dag.add_edge(dep, dest);
            }
        }
        dag.topological_order()?;
        Ok(dag)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Kahn's algorithm with a lexicographically ordered worklist: when
    /// several nodes are ready simultaneously the smallest identifier is
    /// extracted first, so the order is a pure function of the edge set.
    pub fn topological_order(&self) -> CoreResult<Vec<String>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                (
                    idx,
                    self.graph.neighbors_directed(idx, Direction::Incoming).count(),
                )
            })
            .collect();

        let mut ready: BTreeSet<(String, NodeIndex)> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&idx, _)| (self.graph[idx].clone(), idx))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some((name, idx)) = ready.pop_first() {
            order.push(name);
            for succ in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(deg) = in_degree.get_mut(&succ) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert((self.graph[succ].clone(), succ));
                    }
                }
            }
            in_degree.remove(&idx);
        }

        if order.len() != self.graph.node_count() {
            // everything never extracted is part of (or downstream of) a cycle
            let mut residual: Vec<String> = in_degree
                .keys()
                .map(|idx| self.graph[*idx].clone())
                .collect();
            residual.sort();
            return Err(CoreError::CycleDetected {
                nodes: residual.join(", "),
            });
        }

        Ok(order)
    }

    /// Direct dependencies (predecessors) of a node, sorted.
    pub fn dependencies(&self, id: &str) -> Vec<String> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut deps: Vec<String> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|pred| self.graph[pred].clone())
            .collect();
        deps.sort();
        deps
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
