//! Failure Cascade Policy
//!
//! Decides, just before a node would run, whether it must be skipped.
//! The scheduler places every dependency before its dependents, so checking
//! direct dependencies against the trace so far is enough for the skip to
//! propagate through arbitrarily deep chains.

use std::collections::HashSet;

use log::debug;

use crate::report::TraceRecorder;
use crate::workflow::Graph;

/// Decision for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every dependency succeeded; hand the node to the executor.
    Run,
    /// Mark the node skipped with this reason.
    Skip(String),
}

/// Cascade rules for one run.
pub struct CascadePolicy<'g> {
    graph: &'g Graph,
    excluded: HashSet<&'g str>,
}

impl<'g> CascadePolicy<'g> {
    /// `excluded` holds the nodes the scheduler could not order.
    pub fn new(graph: &'g Graph, excluded: &'g [String]) -> Self {
        Self {
            graph,
            excluded: excluded.iter().map(String::as_str).collect(),
        }
    }

    /// Decides whether `node_id` runs, given what has been recorded so far.
    pub fn decide(&self, node_id: &str, recorder: &TraceRecorder) -> Verdict {
        if self.excluded.contains(node_id) {
            return Verdict::Skip("excluded: node is on or downstream of a dependency cycle".to_string());
        }

        for dependency in self.graph.dependencies(node_id) {
            match recorder.status(dependency) {
                Some(status) if status.blocks_dependents() => {
                    debug!(
                        "Cascade: '{}' skipped because '{}' is {}",
                        node_id, dependency, status
                    );
                    return Verdict::Skip(format!("upstream failure: {}", dependency));
                }
                Some(_) => {}
                None => {
                    return Verdict::Skip(format!("upstream not executed: {}", dependency));
                }
            }
        }

        Verdict::Run
    }
}
