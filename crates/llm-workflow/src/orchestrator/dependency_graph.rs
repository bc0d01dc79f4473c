//! Dependency graph over task ids.
//!
//! Used to validate plans before execution: a plan is only runnable if its
//! dependency relation is a DAG.

use std::collections::{BTreeMap, BTreeSet};

/// A directed graph of task dependencies.
///
/// Edges point from a task to the tasks it depends on. Ordered collections
/// keep traversal, and therefore reported cycles, deterministic.
///
/// ```
/// use llm_workflow::orchestrator::DependencyGraph;
///
/// let mut graph = DependencyGraph::new();
/// graph.add_dependency("summarize", "extract"); // summarize depends on extract
///
/// assert!(graph.get_dependencies("summarize").contains("extract"));
/// assert!(!graph.has_cycle());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// task_id -> ids it depends on
    nodes: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node without dependencies. No-op if it already exists.
    pub fn add_node(&mut self, task_id: &str) {
        self.nodes.entry(task_id.to_string()).or_default();
    }

    /// Adds the edge "`task_id` depends on `depends_on`", creating both nodes.
    pub fn add_dependency(&mut self, task_id: &str, depends_on: &str) {
        self.add_node(task_id);
        self.add_node(depends_on);

        self.nodes
            .entry(task_id.to_string())
            .or_default()
            .insert(depends_on.to_string());
    }

    pub fn get_dependencies(&self, task_id: &str) -> BTreeSet<String> {
        self.nodes.get(task_id).cloned().unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Returns one cycle as a path `[a, b, ..., a]`, or `None` for a DAG.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut done = BTreeSet::new();
        let mut stack = Vec::new();

        for node in self.nodes.keys() {
            if let Some(cycle) = self.find_cycle_dfs(node, &mut done, &mut stack) {
                return Some(cycle);
            }
        }

        None
    }

    fn find_cycle_dfs(
        &self,
        node: &str,
        done: &mut BTreeSet<String>,
        stack: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        if let Some(pos) = stack.iter().position(|n| n == node) {
            let mut cycle = stack[pos..].to_vec();
            cycle.push(node.to_string());
            return Some(cycle);
        }

        if done.contains(node) {
            return None;
        }

        stack.push(node.to_string());

        if let Some(deps) = self.nodes.get(node) {
            for dep in deps {
                if let Some(cycle) = self.find_cycle_dfs(dep, done, stack) {
                    return Some(cycle);
                }
            }
        }

        stack.pop();
        done.insert(node.to_string());
        None
    }
}
