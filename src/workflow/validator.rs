//! Graph Validation
//!
//! Turns a [`GraphDocument`] into a [`Graph`] and a list of structural
//! violations:
//! - Duplicate node IDs abort validation
//! - Edges naming unknown nodes are recorded and dropped
//! - Cycles are reported by the scheduler (see [`super::planner`])

use std::collections::HashSet;
use std::fmt;

use log::{debug, info, warn};

use super::graph::Graph;
use super::model::GraphDocument;
use crate::error::EngineError;

/// Non-fatal structural defect recorded against a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// An edge endpoint names a node that is not in the document.
    UnknownReference {
        source: String,
        target: String,
        missing: String,
    },
    /// These nodes could not be ordered: they sit on a cycle or depend on one.
    Cycle { nodes: Vec<String> },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownReference {
                source,
                target,
                missing,
            } => write!(
                f,
                "Edge '{}' -> '{}' references unknown node '{}'",
                source, target, missing
            ),
            Self::Cycle { nodes } => write!(
                f,
                "Cyclic dependency detected; nodes not executed: {}",
                nodes.join(", ")
            ),
        }
    }
}

/// Builds the dependency graph for a document.
///
/// Returns the graph with every valid edge plus the reference violations
/// found on the way. Unknown endpoints are reported once per edge side.
///
/// # Errors
///
/// [`EngineError::DuplicateNodeId`] if two nodes share an ID.
pub fn parse_and_validate(document: &GraphDocument) -> Result<(Graph, Vec<Violation>), EngineError> {
    info!(
        "Validating document '{}' with {} nodes",
        document.name,
        document.nodes.len()
    );

    // Check for duplicate IDs
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for node in &document.nodes {
        if !seen_ids.insert(node.id.as_str()) {
            return Err(EngineError::DuplicateNodeId(node.id.clone()));
        }
    }

    let mut graph = Graph::with_nodes(document.nodes.clone());
    let mut violations = Vec::new();

    for edge in document.declared_edges() {
        let mut dangling = false;

        for endpoint in [&edge.source, &edge.target] {
            if !graph.contains(endpoint) {
                let violation = Violation::UnknownReference {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    missing: endpoint.clone(),
                };
                warn!("{}", violation);
                violations.push(violation);
                dangling = true;
            }
        }

        if !dangling && !graph.add_edge(&edge.source, &edge.target) {
            debug!("Duplicate edge '{}' -> '{}' ignored", edge.source, edge.target);
        }
    }

    debug!(
        "Graph built: {} nodes, {} edges, roots {:?}, leaves {:?}",
        graph.len(),
        graph.edge_count(),
        graph.roots(),
        graph.leaves()
    );

    Ok((graph, violations))
}
