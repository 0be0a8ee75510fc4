//! Agent characteristics and state updates for the Deliberation navigator.
//!
//! This crate holds the logic layer for the deliberating agent: its
//! emotional and ethical characteristics and the batch update applied on
//! arrival at a node. It performs no I/O.
//!
//! # Modules
//!
//! - [`agent`] -- The mutable characteristic store ([`AgentState`])
//! - [`error`] -- Error types for agent operations ([`AgentError`])

pub mod agent;
pub mod error;

pub use agent::{AgentState, Characteristic, UpdateReport};
pub use error::AgentError;
