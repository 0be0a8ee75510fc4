//! Graph provider trait and the in-memory implementation.
//!
//! The navigator never owns the scenario. It asks a [`GraphProvider`] for
//! one node and its outgoing edges per step and awaits the answer before
//! evaluating anything, because the next choice depends on the updates the
//! previous one applied. A provider may be an in-memory [`ScenarioGraph`], a
//! database, or a test double that fails on purpose.

use std::future::Future;

use deliberation_types::{Edge, NodeData, NodeId, UnknownOperator};
use deliberation_world::ScenarioGraph;

/// Errors a graph provider can report.
///
/// Any of these ends the run; the navigator hands back the trace collected
/// so far together with the error.
#[derive(Debug, thiserror::Error)]
pub enum GraphProviderError {
    /// The backing store could not be reached or did not answer.
    #[error("graph provider unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The backing store answered with data that cannot be a scenario.
    #[error("malformed scenario data: {message}")]
    Malformed {
        /// Description of what was wrong.
        message: String,
    },

    /// A stored condition uses an operator outside `=, >=, <=, >, <`.
    #[error(transparent)]
    UnknownOperator(#[from] UnknownOperator),
}

/// Read access to a scenario graph.
///
/// Edges must be returned in a stable order; the navigator breaks ties in
/// favour of the edge listed first.
pub trait GraphProvider {
    /// Fetch a node, or `None` if the graph has no node with this id.
    fn get_node(
        &self,
        id: &NodeId,
    ) -> impl Future<Output = Result<Option<NodeData>, GraphProviderError>> + Send;

    /// Fetch the outgoing edges of a node in evaluation order.
    ///
    /// A node without outgoing edges, or an unknown node, yields an empty
    /// list.
    fn get_outgoing_edges(
        &self,
        id: &NodeId,
    ) -> impl Future<Output = Result<Vec<Edge>, GraphProviderError>> + Send;
}

impl GraphProvider for ScenarioGraph {
    async fn get_node(&self, id: &NodeId) -> Result<Option<NodeData>, GraphProviderError> {
        Ok(self.node(id).cloned())
    }

    async fn get_outgoing_edges(&self, id: &NodeId) -> Result<Vec<Edge>, GraphProviderError> {
        Ok(self.outgoing_edges(id).into_iter().cloned().collect())
    }
}
