//! Opt-in cycle diagnostics
//!
//! The engine never detects cycles: a dependency loop with no
//! externally-definable entry point simply stays `Pending` forever.
//! Hosts that want to distinguish "still fetching" from "deadlocked"
//! can run this pass over the not-yet-loaded portion of the graph. It
//! is read-only and never alters resolution behavior.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::resolver::engine::Resolver;

impl Resolver {
    /// Whether the pending portion of the graph contains a dependency
    /// cycle.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.pending_graph())
    }

    /// Detect and return one cycle among the pending modules, as the
    /// list of names along the loop.
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        let graph = self.pending_graph();
        if !is_cyclic_directed(&graph) {
            return None;
        }

        let mut visited = HashMap::new();
        let mut stack = Vec::new();
        for node in graph.node_indices() {
            if !visited.contains_key(&node) {
                if let Some(cycle) = dfs_cycle_detect(&graph, node, &mut visited, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    /// Build a directed graph over not-yet-loaded defined modules and
    /// their still-pending dependencies. Edge direction is dependency
    /// to dependent, matching propagation order.
    fn pending_graph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::new();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();

        let mut index_of = |graph: &mut DiGraph<String, ()>, name: &str| -> NodeIndex {
            if let Some(&idx) = node_map.get(name) {
                return idx;
            }
            let idx = graph.add_node(name.to_string());
            node_map.insert(name.to_string(), idx);
            idx
        };

        for (name, record) in self.registry().records() {
            if !record.defined || record.is_loaded() {
                continue;
            }
            let node = index_of(&mut graph, name);
            for dep in &record.dependencies {
                if self.registry().is_loaded(dep) {
                    continue;
                }
                let dep_node = index_of(&mut graph, dep);
                graph.add_edge(dep_node, node, ());
            }
        }

        graph
    }
}

/// DFS cycle extraction: returns the names along the first back edge
/// found from `node`.
fn dfs_cycle_detect(
    graph: &DiGraph<String, ()>,
    node: NodeIndex,
    visited: &mut HashMap<NodeIndex, bool>,
    stack: &mut Vec<NodeIndex>,
) -> Option<Vec<String>> {
    visited.insert(node, true);
    stack.push(node);

    for neighbor in graph.neighbors(node) {
        if !visited.contains_key(&neighbor) {
            if let Some(cycle) = dfs_cycle_detect(graph, neighbor, visited, stack) {
                return Some(cycle);
            }
        } else if let Some(start) = stack.iter().position(|&n| n == neighbor) {
            return Some(stack[start..].iter().map(|&idx| graph[idx].clone()).collect());
        }
    }

    stack.pop();
    None
}

#[cfg(test)]
mod tests {
    include!("cycle.test.rs");
}
