//! Error types for the deliberation-agents crate.

use deliberation_types::FuzzyError;

/// Errors that can occur during agent state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// A direct lookup named a characteristic the agent does not have.
    #[error("unknown characteristic: {name}")]
    UnknownCharacteristic {
        /// The name that was looked up.
        name: String,
    },

    /// A characteristic name was declared twice, possibly across namespaces.
    #[error("characteristic {name} is already defined")]
    DuplicateCharacteristic {
        /// The repeated name.
        name: String,
    },

    /// Applying an update moved a characteristic out of range.
    #[error("update of characteristic {name} failed: {source}")]
    UpdateOverflow {
        /// The characteristic being updated.
        name: String,
        /// The underlying fuzzy number error.
        source: FuzzyError,
    },
}
