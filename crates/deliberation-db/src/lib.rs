//! `PostgreSQL` data layer for the Deliberation navigator.
//!
//! The database can hold the scenario graph itself (so large or shared
//! scenarios need not live in a config file) and the protocol of every
//! finished run.
//!
//! # Modules
//!
//! - [`database`] -- Connection, migrations, and access to the stores
//! - [`scenario_store`] -- Node, edge, condition, and update queries
//! - [`run_store`] -- Finished run persistence
//! - [`error`] -- Shared error types

pub mod database;
pub mod error;
pub mod run_store;
pub mod scenario_store;

// Re-export primary types for convenience.
pub use database::{Database, DatabaseOptions};
pub use error::DbError;
pub use run_store::{RunRecord, RunRow, RunStore};
pub use scenario_store::ScenarioStore;
