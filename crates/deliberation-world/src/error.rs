//! Error types for the `deliberation-world` crate.

use deliberation_types::{EdgeId, FuzzyError, NodeId};

/// Errors that can occur while building a scenario graph.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A node was not found in the scenario graph.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node id was inserted twice.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// An edge id was inserted twice.
    #[error("duplicate edge id: {0}")]
    DuplicateEdge(EdgeId),

    /// A fuzzy number in a built-in scenario is malformed.
    #[error("invalid fuzzy number in scenario: {0}")]
    Fuzzy(#[from] FuzzyError),
}
