//! Scenario definitions as authored in configuration files.
//!
//! A definition nests each node's outgoing edges under the node and keeps
//! emotional and ethical conditions in separate lists, which is how
//! scenario authors think about them. [`ScenarioDefinition::into_graph`]
//! flattens that into a [`ScenarioGraph`], emotional conditions first.
//!
//! ```yaml
//! nodes:
//!   - id: V0
//!     description: Agent witnesses a theft
//!     edges:
//!       - id: E1
//!         description: Report the theft
//!         target: V1
//!         ethical_conditions:
//!           - { variable: responsibility, operator: ">=", constraint: [0.7, 0.8, 0.9] }
//!   - id: V1
//!     description: Security detains the teenager
//!     updates: { guilt: 0.1 }
//! ```

use std::collections::BTreeMap;

use deliberation_types::{
    CharacteristicProfile, Condition, Edge, EdgeId, NodeData, NodeId, UpdateEntry,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::WorldError;
use crate::scenario_graph::ScenarioGraph;

/// A whole scenario network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Every node, with its outgoing edges nested inside.
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
}

/// One node and the edges leaving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Node identifier.
    pub id: NodeId,
    /// What happens in this situation.
    #[serde(default)]
    pub description: String,
    /// Characteristic deltas applied on arrival.
    #[serde(default)]
    pub updates: BTreeMap<String, Decimal>,
    /// Characteristics an agent starting here is seeded with.
    #[serde(default)]
    pub profile: Option<CharacteristicProfile>,
    /// Outgoing edges, in the order they should be evaluated.
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

/// One outgoing edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    /// Edge identifier.
    pub id: EdgeId,
    /// The action this edge represents.
    #[serde(default)]
    pub description: String,
    /// Destination node.
    pub target: NodeId,
    /// Conditions on emotional characteristics.
    #[serde(default)]
    pub emotional_conditions: Vec<Condition>,
    /// Conditions on ethical characteristics.
    #[serde(default)]
    pub ethical_conditions: Vec<Condition>,
}

impl ScenarioDefinition {
    /// Build the in-memory graph.
    ///
    /// All nodes are added before any edge, so edges may reference nodes
    /// defined later in the list. Edges pointing at undefined nodes are
    /// kept and logged.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateNode`] or [`WorldError::DuplicateEdge`]
    /// if an identifier is reused.
    pub fn into_graph(self) -> Result<ScenarioGraph, WorldError> {
        let mut graph = ScenarioGraph::new();
        let mut pending = Vec::with_capacity(self.nodes.len());

        for node in self.nodes {
            let updates = node
                .updates
                .into_iter()
                .map(|(variable, delta)| UpdateEntry { variable, delta })
                .collect();
            graph.add_node(NodeData {
                id: node.id.clone(),
                description: node.description,
                updates,
                profile: node.profile,
            })?;
            pending.push((node.id, node.edges));
        }

        for (source, edges) in pending {
            for edge in edges {
                graph.add_edge(&source, edge.into_edge())?;
            }
        }

        for edge in graph.dangling_edges() {
            warn!(edge = %edge.id, target = %edge.target, "edge targets an undefined node");
        }

        Ok(graph)
    }
}

impl EdgeDefinition {
    /// Merge both condition lists into a single [`Edge`].
    pub fn into_edge(self) -> Edge {
        let mut conditions = self.emotional_conditions;
        conditions.extend(self.ethical_conditions);
        Edge {
            id: self.id,
            description: self.description,
            target: self.target,
            conditions,
        }
    }
}
