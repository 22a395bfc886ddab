//! Validated dependency graph.
//!
//! Nodes live in an arena in document order; adjacency is kept in two
//! id-keyed tables so nodes never reference each other directly.

use std::collections::{BTreeSet, HashMap};

use super::model::NodeSpec;

/// In-memory graph derived from a [`GraphDocument`](super::GraphDocument).
///
/// Built once by [`parse_and_validate`](super::validator::parse_and_validate)
/// and never mutated during execution.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<NodeSpec>,
    positions: HashMap<String, usize>,
    dependencies: HashMap<String, BTreeSet<String>>,
    dependents: HashMap<String, BTreeSet<String>>,
}

impl Graph {
    /// Creates an edgeless graph. Callers guarantee unique ids.
    pub(crate) fn with_nodes(nodes: Vec<NodeSpec>) -> Self {
        let positions = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();

        let dependencies = nodes
            .iter()
            .map(|node| (node.id.clone(), BTreeSet::new()))
            .collect();
        let dependents = nodes
            .iter()
            .map(|node| (node.id.clone(), BTreeSet::new()))
            .collect();

        Self {
            nodes,
            positions,
            dependencies,
            dependents,
        }
    }

    /// Adds `source -> target`. Returns false if either endpoint is unknown
    /// or the edge already exists.
    pub(crate) fn add_edge(&mut self, source: &str, target: &str) -> bool {
        if !self.contains(source) || !self.contains(target) {
            return false;
        }

        let inserted = self
            .dependencies
            .entry(target.to_string())
            .or_default()
            .insert(source.to_string());

        if inserted {
            self.dependents
                .entry(source.to_string())
                .or_default()
                .insert(target.to_string());
        }

        inserted
    }

    /// Nodes in document order.
    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&NodeSpec> {
        self.position(id).map(|index| &self.nodes[index])
    }

    /// Document-order index of a node.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Direct predecessors of a node, sorted by id.
    pub fn dependencies(&self, id: &str) -> impl Iterator<Item = &str> + '_ {
        self.dependencies
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Direct successors of a node, sorted by id.
    pub fn dependents(&self, id: &str) -> impl Iterator<Item = &str> + '_ {
        self.dependents
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Number of direct predecessors.
    pub fn in_degree(&self, id: &str) -> usize {
        self.dependencies.get(id).map_or(0, BTreeSet::len)
    }

    /// Nodes with no dependencies, in document order.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| self.in_degree(&node.id) == 0)
            .map(|node| node.id.as_str())
            .collect()
    }

    /// Nodes nothing depends on, in document order.
    pub fn leaves(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| self.dependents(&node.id).next().is_none())
            .map(|node| node.id.as_str())
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(BTreeSet::len).sum()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
