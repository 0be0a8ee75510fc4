//! Identifier newtypes.
//!
//! Scenario nodes and edges are named by their authors (`V0`, `E1`, ...), so
//! [`NodeId`] and [`EdgeId`] wrap a [`String`]. Keeping them as distinct
//! types prevents an edge name from being passed where a node is expected.
//!
//! [`RunId`] identifies a single traversal and uses UUID v7 (time-ordered)
//! so traces sort by the moment their run started.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around a scenario-authored name.
macro_rules! define_name_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the owned inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
    };
}

define_name_id! {
    /// Identifier of a scenario node (an event the agent can find itself in).
    NodeId
}

define_name_id! {
    /// Identifier of a scenario edge (an action leading from one node to another).
    EdgeId
}

/// Unique identifier for one traversal of the scenario graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new run identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_ids_display_their_name() {
        assert_eq!(NodeId::new("V0").to_string(), "V0");
        assert_eq!(EdgeId::from("E1").as_str(), "E1");
    }

    #[test]
    fn name_ids_serialize_transparently() {
        let json = serde_json::to_string(&NodeId::new("V1")).ok();
        assert_eq!(json.as_deref(), Some("\"V1\""));
        let restored: Result<EdgeId, _> = serde_json::from_str("\"E2\"");
        assert_eq!(restored.ok(), Some(EdgeId::new("E2")));
    }

    #[test]
    fn run_ids_are_unique() {
        let first = RunId::new();
        let second = RunId::new();
        assert_ne!(first, second);
        assert_ne!(first.into_inner(), Uuid::nil());
    }
}
