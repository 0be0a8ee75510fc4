//! Scenario graph: situations as nodes, actions as directed edges.
//!
//! The [`ScenarioGraph`] is the in-memory backing store for a scenario. It
//! keeps every [`NodeData`] and [`Edge`], and an outbound adjacency list per
//! node that preserves insertion order. That order is the order a provider
//! serves edges in, and therefore the tie-break order of the navigator.
//!
//! An edge may point at a node that was never added. Such a graph is still
//! usable: an agent following the edge simply ends up nowhere.
//! [`ScenarioGraph::dangling_edges`] lists them for diagnostics.

use std::collections::BTreeMap;

use deliberation_types::{Edge, EdgeId, NodeData, NodeId};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// The scenario network holding all nodes and edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioGraph {
    /// All nodes indexed by identifier.
    nodes: BTreeMap<NodeId, NodeData>,
    /// All edges indexed by identifier.
    edges: BTreeMap<EdgeId, Edge>,
    /// Outbound adjacency: node -> edge ids in insertion order.
    outbound: BTreeMap<NodeId, Vec<EdgeId>>,
}

impl ScenarioGraph {
    /// Create an empty scenario graph.
    pub const fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            outbound: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Node operations
    // -------------------------------------------------------------------

    /// Add a node to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateNode`] if a node with the same id
    /// already exists.
    pub fn add_node(&mut self, node: NodeData) -> Result<(), WorldError> {
        let id = node.id.clone();
        if self.nodes.contains_key(&id) {
            return Err(WorldError::DuplicateNode(id));
        }
        self.outbound.entry(id.clone()).or_default();
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Get a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Return the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.nodes.values()
    }

    // -------------------------------------------------------------------
    // Edge operations
    // -------------------------------------------------------------------

    /// Add an outgoing edge to `source`.
    ///
    /// The source must already exist; the target need not.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if the source is missing, or
    /// [`WorldError::DuplicateEdge`] if the edge id already exists.
    pub fn add_edge(&mut self, source: &NodeId, edge: Edge) -> Result<(), WorldError> {
        if !self.nodes.contains_key(source) {
            return Err(WorldError::NodeNotFound(source.clone()));
        }
        if self.edges.contains_key(&edge.id) {
            return Err(WorldError::DuplicateEdge(edge.id));
        }
        let id = edge.id.clone();
        self.edges.insert(id.clone(), edge);
        self.outbound.entry(source.clone()).or_default().push(id);
        Ok(())
    }

    /// Get an edge by id.
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Return the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of a node, in insertion order.
    ///
    /// Unknown nodes have no outgoing edges.
    pub fn outgoing_edges(&self, source: &NodeId) -> Vec<&Edge> {
        self.outbound
            .get(source)
            .map(|ids| ids.iter().filter_map(|id| self.edges.get(id)).collect())
            .unwrap_or_default()
    }

    /// Edges whose target node does not exist in the graph.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|edge| !self.nodes.contains_key(&edge.target))
            .collect()
    }
}
