//! Error types for the navigator binary.
//!
//! [`EngineError`] wraps every failure mode between loading the
//! configuration and writing the last protocol line.

use deliberation_agents::AgentError;
use deliberation_core::{ConfigError, RunFailure};
use deliberation_db::DbError;

/// Top-level error for the navigator binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration or scenario loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Connecting to, migrating, or writing the database failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: DbError,
    },

    /// A configured agent profile is not a valid agent.
    #[error("agent {name} is invalid: {source}")]
    Agent {
        /// Name of the agent profile.
        name: String,
        /// The underlying agent error.
        source: Box<AgentError>,
    },

    /// A run stopped before reaching a termination reason.
    #[error("run of {agent} failed: {source}")]
    Run {
        /// Name of the agent whose run failed.
        agent: String,
        /// The failure, carrying the partial trace.
        source: Box<RunFailure>,
    },

    /// Writing the protocol failed.
    #[error("failed to write protocol: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Encoding a JSON protocol document failed.
    #[error("failed to encode protocol: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
