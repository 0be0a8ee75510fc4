//! Shared type definitions for the Deliberation scenario navigator.
//!
//! This crate is the single source of truth for the data that flows between
//! the scenario graph, the agent, the decision engine, and the reporting
//! surface.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier newtypes for nodes, edges, and runs
//! - [`fuzzy`] -- Triangular fuzzy numbers ([`FuzzyNumber`])
//! - [`enums`] -- Comparison operators, characteristic namespaces, termination reasons
//! - [`structs`] -- Conditions, update entries, edges, nodes, and trace records

pub mod enums;
pub mod fuzzy;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    CharacteristicKind, ComparisonOperator, TerminationReason, UnknownOperator, UnsatisfiedReason,
};
pub use fuzzy::{FuzzyError, FuzzyNumber};
pub use ids::{EdgeId, NodeId, RunId};
pub use structs::{
    CharacteristicProfile, Condition, Edge, EdgeOutcome, NodeData, TransitionRecord, UpdateEntry,
    VisitRecord,
};
