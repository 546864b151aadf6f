/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Generic cycle-detecting depth-first post-order traversal.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use indexmap::IndexSet;
use itertools::Itertools;
use thiserror::Error;

/// The graph was found to contain a cycle. The message lists the full cycle,
/// starting and ending at the node the back-edge points to.
#[derive(Error, Debug)]
#[error("Cycle found: {}", _0.iter().join(" -> "))]
pub struct CycleError(Vec<String>);

impl CycleError {
    pub fn cycle(&self) -> &[String] {
        &self.0
    }
}

/// A depth-first post-order traversal over a graph that is discovered as it
/// is walked: `find_children` is free to do real work (like parsing a build
/// file) to answer. `on_node_explored` fires once per node, after all of the
/// node's children have been explored.
pub trait AcyclicDepthFirstPostOrderTraversal<N>
where
    N: Eq + Hash + Clone + Display,
{
    fn find_children(&mut self, node: &N) -> anyhow::Result<Vec<N>>;

    fn on_node_explored(&mut self, node: &N) -> anyhow::Result<()>;
}

/// Walks the graph reachable from `roots`. Nodes shared between branches are
/// explored once; re-entering a node that is still on the traversal stack is
/// a [`CycleError`].
///
/// The walk keeps an explicit stack of `(node, remaining children)` frames
/// rather than recursing, so pathologically deep dependency chains cannot
/// overflow the call stack.
pub fn traverse<N, D>(delegate: &mut D, roots: impl IntoIterator<Item = N>) -> anyhow::Result<()>
where
    N: Eq + Hash + Clone + Display,
    D: AcyclicDepthFirstPostOrderTraversal<N>,
{
    struct Frame<N> {
        node: N,
        children: std::vec::IntoIter<N>,
    }

    // `in_progress` is in stack order, which is what lets a detected cycle be
    // reported as a path.
    let mut in_progress: IndexSet<N> = IndexSet::new();
    let mut completed: HashSet<N> = HashSet::new();
    let mut stack: Vec<Frame<N>> = Vec::new();

    for root in roots {
        if completed.contains(&root) {
            continue;
        }
        let children = delegate.find_children(&root)?;
        in_progress.insert(root.clone());
        stack.push(Frame {
            node: root,
            children: children.into_iter(),
        });

        while let Some(frame) = stack.last_mut() {
            match frame.children.next() {
                Some(child) => {
                    if in_progress.contains(&child) {
                        return Err(cycle_error(&in_progress, &child).into());
                    }
                    if completed.contains(&child) {
                        continue;
                    }
                    let grandchildren = delegate.find_children(&child)?;
                    in_progress.insert(child.clone());
                    stack.push(Frame {
                        node: child,
                        children: grandchildren.into_iter(),
                    });
                }
                None => {
                    let frame = stack.pop().unwrap();
                    in_progress.pop();
                    completed.insert(frame.node.clone());
                    delegate.on_node_explored(&frame.node)?;
                }
            }
        }
    }

    Ok(())
}

fn cycle_error<N: Eq + Hash + Clone + Display>(in_progress: &IndexSet<N>, child: &N) -> CycleError {
    let mut cycle: Vec<String> = in_progress
        .iter()
        .skip_while(|node| *node != child)
        .map(|node| node.to_string())
        .collect();
    cycle.push(child.to_string());
    CycleError(cycle)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use assert_matches::assert_matches;

    use crate::traversal::traverse;
    use crate::traversal::AcyclicDepthFirstPostOrderTraversal;
    use crate::traversal::CycleError;

    struct RecordingTraversal {
        edges: BTreeMap<&'static str, Vec<&'static str>>,
        explored: Vec<String>,
    }

    impl RecordingTraversal {
        fn new(edges: &[(&'static str, &[&'static str])]) -> Self {
            RecordingTraversal {
                edges: edges.iter().map(|(n, deps)| (*n, deps.to_vec())).collect(),
                explored: Vec::new(),
            }
        }
    }

    impl AcyclicDepthFirstPostOrderTraversal<String> for RecordingTraversal {
        fn find_children(&mut self, node: &String) -> anyhow::Result<Vec<String>> {
            Ok(self
                .edges
                .get(node.as_str())
                .map(|deps| deps.iter().map(|d| (*d).to_owned()).collect())
                .unwrap_or_default())
        }

        fn on_node_explored(&mut self, node: &String) -> anyhow::Result<()> {
            self.explored.push(node.clone());
            Ok(())
        }
    }

    fn run(t: &mut RecordingTraversal, roots: &[&str]) -> anyhow::Result<()> {
        traverse(t, roots.iter().map(|r| (*r).to_owned()))
    }

    #[test]
    fn test_post_order() -> anyhow::Result<()> {
        let mut t = RecordingTraversal::new(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);
        run(&mut t, &["a"])?;
        assert_eq!(vec!["c", "b", "a"], t.explored);
        Ok(())
    }

    #[test]
    fn test_diamond_explored_once() -> anyhow::Result<()> {
        let mut t = RecordingTraversal::new(&[
            ("a", &["b", "c"]),
            ("b", &["d"]),
            ("c", &["d"]),
            ("d", &[]),
        ]);
        run(&mut t, &["a"])?;
        assert_eq!(vec!["d", "b", "c", "a"], t.explored);
        Ok(())
    }

    #[test]
    fn test_two_cycle() {
        let mut t = RecordingTraversal::new(&[("a", &["b"]), ("b", &["a"])]);
        let err = run(&mut t, &["a"]).unwrap_err();
        assert_matches!(err.downcast_ref::<CycleError>(), Some(cycle) => {
            assert_eq!(&["a", "b", "a"], cycle.cycle());
        });
        assert_eq!("Cycle found: a -> b -> a", err.to_string());
    }

    #[test]
    fn test_self_cycle() {
        let mut t = RecordingTraversal::new(&[("a", &["a"])]);
        let err = run(&mut t, &["a"]).unwrap_err();
        assert_eq!("Cycle found: a -> a", err.to_string());
    }

    #[test]
    fn test_longer_cycle_reported_from_reentry_point() {
        let mut t =
            RecordingTraversal::new(&[("a", &["b"]), ("b", &["c"]), ("c", &["b"])]);
        let err = run(&mut t, &["a"]).unwrap_err();
        assert_eq!("Cycle found: b -> c -> b", err.to_string());
    }

    #[test]
    fn test_completed_roots_are_skipped() -> anyhow::Result<()> {
        let mut t = RecordingTraversal::new(&[("a", &["b"]), ("b", &[])]);
        run(&mut t, &["a", "b", "a"])?;
        assert_eq!(vec!["b", "a"], t.explored);
        Ok(())
    }

    #[test]
    fn test_deep_chain_does_not_overflow() -> anyhow::Result<()> {
        struct DeepTraversal {
            explored: usize,
        }

        impl AcyclicDepthFirstPostOrderTraversal<u32> for DeepTraversal {
            fn find_children(&mut self, node: &u32) -> anyhow::Result<Vec<u32>> {
                Ok(if *node < 100_000 {
                    vec![*node + 1]
                } else {
                    Vec::new()
                })
            }

            fn on_node_explored(&mut self, _node: &u32) -> anyhow::Result<()> {
                self.explored += 1;
                Ok(())
            }
        }

        let mut t = DeepTraversal { explored: 0 };
        traverse(&mut t, [0])?;
        assert_eq!(100_001, t.explored);
        Ok(())
    }
}
