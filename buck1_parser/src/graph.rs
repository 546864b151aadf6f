/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use buck1_node::rules::BuildRule;
use indexmap::IndexMap;
use indexmap::IndexSet;

/// A directed graph under construction. Nodes and edges are kept in
/// insertion order so that traversals are deterministic.
#[derive(Debug)]
pub struct MutableDirectedGraph<T: Eq + Hash + Clone> {
    nodes: IndexSet<T>,
    outgoing: IndexMap<T, IndexSet<T>>,
}

impl<T: Eq + Hash + Clone> MutableDirectedGraph<T> {
    pub fn new() -> Self {
        MutableDirectedGraph {
            nodes: IndexSet::new(),
            outgoing: IndexMap::new(),
        }
    }

    pub fn add_node(&mut self, node: T) -> bool {
        self.nodes.insert(node)
    }

    /// Adds an edge, inserting both endpoints as nodes if they are not
    /// already present.
    pub fn add_edge(&mut self, source: T, target: T) {
        self.nodes.insert(source.clone());
        self.nodes.insert(target.clone());
        self.outgoing
            .entry(source)
            .or_insert_with(IndexSet::new)
            .insert(target);
    }

    pub fn contains_node(&self, node: &T) -> bool {
        self.nodes.contains(node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter()
    }

    pub fn outgoing(&self, node: &T) -> impl Iterator<Item = &T> {
        self.outgoing.get(node).into_iter().flatten()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(IndexSet::len).sum()
    }

    /// Whether the graph has no directed cycle. Iterative three-color DFS.
    pub fn is_acyclic(&self) -> bool {
        enum WorkItem<'a, T> {
            Visit(&'a T),
            Leave(&'a T),
        }

        let mut in_progress: HashSet<&T> = HashSet::new();
        let mut done: HashSet<&T> = HashSet::new();

        for start in &self.nodes {
            if done.contains(start) {
                continue;
            }
            let mut work = vec![WorkItem::Visit(start)];
            while let Some(item) = work.pop() {
                match item {
                    WorkItem::Visit(node) => {
                        if done.contains(node) {
                            continue;
                        }
                        if !in_progress.insert(node) {
                            return false;
                        }
                        work.push(WorkItem::Leave(node));
                        for succ in self.outgoing(node) {
                            if in_progress.contains(succ) {
                                return false;
                            }
                            if !done.contains(succ) {
                                work.push(WorkItem::Visit(succ));
                            }
                        }
                    }
                    WorkItem::Leave(node) => {
                        in_progress.remove(node);
                        done.insert(node);
                    }
                }
            }
        }
        true
    }
}

impl<T: Eq + Hash + Clone> Default for MutableDirectedGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The finished graph of built rules, edges pointing from a rule to each of
/// its deps. Guaranteed acyclic: construction happens during a traversal
/// that has already rejected cycles.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: MutableDirectedGraph<Arc<BuildRule>>,
}

impl DependencyGraph {
    pub fn new(graph: MutableDirectedGraph<Arc<BuildRule>>) -> DependencyGraph {
        debug_assert!(graph.is_acyclic(), "dependency graph has a cycle");
        DependencyGraph { graph }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Arc<BuildRule>> {
        self.graph.nodes()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, rule: &Arc<BuildRule>) -> bool {
        self.graph.contains_node(rule)
    }

    /// The deps of `rule` within the graph.
    pub fn outgoing(&self, rule: &Arc<BuildRule>) -> impl Iterator<Item = &Arc<BuildRule>> {
        self.graph.outgoing(rule)
    }

    /// All rules in bottom-up order: a rule appears only after every rule it
    /// depends on. Ties are broken by fully qualified name, so the order is
    /// stable across runs.
    pub fn bottom_up_order(&self) -> Vec<&Arc<BuildRule>> {
        enum WorkItem<'a> {
            Visit(&'a Arc<BuildRule>),
            PostVisit(&'a Arc<BuildRule>),
        }

        let mut roots: Vec<&Arc<BuildRule>> = self.graph.nodes().collect();
        roots.sort_by_key(|rule| rule.fully_qualified_name());

        let mut visited: HashSet<&Arc<BuildRule>> = HashSet::new();
        let mut order: Vec<&Arc<BuildRule>> = Vec::new();
        let mut work: Vec<WorkItem> = roots.into_iter().rev().map(WorkItem::Visit).collect();

        while let Some(item) = work.pop() {
            match item {
                WorkItem::Visit(rule) => {
                    if !visited.insert(rule) {
                        continue;
                    }
                    work.push(WorkItem::PostVisit(rule));
                    let mut deps: Vec<&Arc<BuildRule>> = self
                        .outgoing(rule)
                        .filter(|dep| !visited.contains(dep))
                        .collect();
                    deps.sort_by_key(|dep| dep.fully_qualified_name());
                    for dep in deps.into_iter().rev() {
                        work.push(WorkItem::Visit(dep));
                    }
                }
                WorkItem::PostVisit(rule) => {
                    order.push(rule);
                }
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::MutableDirectedGraph;

    #[test]
    fn test_edges_insert_endpoints() {
        let mut graph = MutableDirectedGraph::new();
        graph.add_edge("a", "b");
        assert!(graph.contains_node(&"a"));
        assert!(graph.contains_node(&"b"));
        assert_eq!(vec![&"b"], graph.outgoing(&"a").collect::<Vec<_>>());
        assert_eq!(0, graph.outgoing(&"b").count());
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = MutableDirectedGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("a", "b");
        assert_eq!(1, graph.edge_count());
    }

    #[test]
    fn test_acyclicity() {
        let mut graph = MutableDirectedGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("a", "c");
        assert!(graph.is_acyclic());

        graph.add_edge("c", "a");
        assert!(!graph.is_acyclic());
    }

    #[test]
    fn test_isolated_nodes_are_acyclic() {
        let mut graph = MutableDirectedGraph::new();
        graph.add_node("a");
        graph.add_node("b");
        assert!(graph.is_acyclic());
    }

    #[test]
    fn test_self_edge_is_a_cycle() {
        let mut graph = MutableDirectedGraph::new();
        graph.add_edge("a", "a");
        assert!(!graph.is_acyclic());
    }
}
