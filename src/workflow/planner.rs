//! Execution Planner
//!
//! Computes the execution order of a validated graph with Kahn's algorithm.
//!
//! Among nodes that are ready at the same time, the one declared earliest in
//! the document goes first, so the order never depends on hash iteration.
//! Nodes that can never become ready (cycles and everything downstream of
//! them) are appended after the ordered prefix and reported as one violation.

use std::collections::BTreeSet;

use log::{debug, warn};

use super::graph::Graph;
use super::validator::Violation;

/// Result of scheduling a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Every node id exactly once: the topological prefix, then the
    /// unresolved remainder in document order.
    pub order: Vec<String>,
    /// Length of the topological prefix.
    pub resolved: usize,
    /// Violations discovered while ordering (at most one cycle report).
    pub violations: Vec<Violation>,
}

impl Schedule {
    /// Nodes that could not be ordered.
    pub fn unresolved(&self) -> &[String] {
        &self.order[self.resolved..]
    }

    /// True when every node was placed in topological order.
    pub fn is_complete(&self) -> bool {
        self.resolved == self.order.len()
    }
}

/// Orders the graph's nodes so each follows all of its dependencies.
pub fn order(graph: &Graph) -> Schedule {
    let nodes = graph.nodes();

    let mut in_degree: Vec<usize> = nodes.iter().map(|n| graph.in_degree(&n.id)).collect();

    // Ready set keyed by document position gives the insertion-order tie-break
    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| index)
        .collect();

    let mut placed = vec![false; nodes.len()];
    let mut order: Vec<String> = Vec::with_capacity(nodes.len());

    while let Some(index) = ready.pop_first() {
        let current = &nodes[index];
        placed[index] = true;
        order.push(current.id.clone());

        for dependent in graph.dependents(&current.id) {
            let Some(position) = graph.position(dependent) else {
                continue;
            };
            in_degree[position] -= 1;
            if in_degree[position] == 0 {
                ready.insert(position);
            }
        }
    }

    let resolved = order.len();
    let mut violations = Vec::new();

    if resolved < nodes.len() {
        let remainder: Vec<String> = nodes
            .iter()
            .zip(&placed)
            .filter(|(_, done)| !**done)
            .map(|(node, _)| node.id.clone())
            .collect();

        let violation = Violation::Cycle {
            nodes: remainder.clone(),
        };
        warn!("{}", violation);
        violations.push(violation);
        order.extend(remainder);
    }

    debug!("Topological order: {:?} ({} resolved)", order, resolved);

    Schedule {
        order,
        resolved,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::model::{GraphDocument, NodeSpec};
    use crate::workflow::validator::parse_and_validate;

    fn graph_of(ids: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut doc = GraphDocument::new("wf", "test");
        for id in ids {
            doc = doc.with_node(NodeSpec::new(*id, "hr", "lookup"));
        }
        for (source, target) in edges {
            doc = doc.with_edge(*source, *target);
        }
        parse_and_validate(&doc).unwrap().0
    }

    fn position(schedule: &Schedule, id: &str) -> usize {
        schedule.order.iter().position(|n| n == id).unwrap()
    }

    #[test]
    fn test_linear_order() {
        let graph = graph_of(&["c", "b", "a"], &[("a", "b"), ("b", "c")]);
        let schedule = order(&graph);

        assert_eq!(schedule.order, vec!["a", "b", "c"]);
        assert!(schedule.is_complete());
        assert!(schedule.violations.is_empty());
    }

    #[test]
    fn test_diamond_uses_insertion_tie_break() {
        let graph = graph_of(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        assert_eq!(order(&graph).order, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_tie_break_follows_document_not_id() {
        let graph = graph_of(&["zeta", "alpha", "mid"], &[]);
        assert_eq!(order(&graph).order, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_earliest_declared_ready_node_goes_first() {
        // "late" becomes ready after "first" runs but is declared before "second"
        let graph = graph_of(&["first", "late", "second"], &[("first", "late")]);
        assert_eq!(order(&graph).order, vec!["first", "late", "second"]);
    }

    #[test]
    fn test_every_node_follows_its_dependencies() {
        let graph = graph_of(
            &["e", "d", "c", "b", "a"],
            &[("a", "b"), ("a", "c"), ("c", "d"), ("b", "d"), ("d", "e"), ("a", "e")],
        );
        let schedule = order(&graph);

        for node in graph.nodes() {
            for dep in graph.dependencies(&node.id) {
                assert!(position(&schedule, dep) < position(&schedule, &node.id));
            }
        }
    }

    #[test]
    fn test_cycle_remainder_appended_in_document_order() {
        // a -> b -> c -> b, and d depends on c
        let graph = graph_of(
            &["a", "d", "b", "c"],
            &[("a", "b"), ("b", "c"), ("c", "b"), ("c", "d")],
        );
        let schedule = order(&graph);

        assert_eq!(schedule.order, vec!["a", "d", "b", "c"]);
        assert_eq!(schedule.resolved, 1);
        assert_eq!(schedule.unresolved(), &["d", "b", "c"]);
        assert!(!schedule.is_complete());
        assert_eq!(
            schedule.violations,
            vec![Violation::Cycle {
                nodes: vec!["d".into(), "b".into(), "c".into()]
            }]
        );
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = graph_of(&["a", "b"], &[("a", "a")]);
        let schedule = order(&graph);

        assert_eq!(schedule.order, vec!["b", "a"]);
        assert_eq!(schedule.unresolved(), &["a"]);
        assert_eq!(schedule.violations.len(), 1);
    }

    #[test]
    fn test_empty_graph() {
        let schedule = order(&Graph::default());
        assert!(schedule.order.is_empty());
        assert!(schedule.is_complete());
    }
}
