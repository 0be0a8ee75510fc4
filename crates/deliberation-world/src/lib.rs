//! Scenario graph storage and built-in scenarios for the Deliberation navigator.
//!
//! This crate models the scenario network: nodes describing situations the
//! agent can find itself in, and directed edges describing the actions that
//! lead between them, each gated by a set of conditions.
//!
//! # Modules
//!
//! - [`definition`] -- Serializable scenario definitions as authored in
//!   configuration files.
//! - [`error`] -- Error types for scenario-graph operations.
//! - [`scenario_graph`] -- The in-memory graph with ordered outbound edges.
//! - [`starting_scenario`] -- The built-in "witnessed theft" scenario and its
//!   two reference agents.

pub mod definition;
pub mod error;
pub mod scenario_graph;
pub mod starting_scenario;

// Re-export primary types at crate root.
pub use definition::{EdgeDefinition, NodeDefinition, ScenarioDefinition};
pub use error::WorldError;
pub use scenario_graph::ScenarioGraph;
pub use starting_scenario::{
    ReferenceAgent, START_NODE, attentive_witness, create_witnessed_theft, indifferent_witness,
};
