//! Scenario and trace records.
//!
//! Conditions and updates are tagged records rather than loose maps, so a
//! scenario that forgets a field fails when it is loaded instead of when an
//! agent happens to reach it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{ComparisonOperator, UnsatisfiedReason};
use crate::fuzzy::FuzzyNumber;
use crate::ids::{EdgeId, NodeId};

/// One constraint on a named characteristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Name of the characteristic being tested.
    pub variable: String,
    /// How the agent's value is compared with the constraint.
    pub operator: ComparisonOperator,
    /// The threshold; only its crisp value takes part in the comparison.
    pub constraint: FuzzyNumber,
}

impl Condition {
    /// Build a condition.
    pub fn new(
        variable: impl Into<String>,
        operator: ComparisonOperator,
        constraint: FuzzyNumber,
    ) -> Self {
        Self {
            variable: variable.into(),
            operator,
            constraint,
        }
    }
}

/// A signed change applied to one characteristic on arrival at a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEntry {
    /// Name of the characteristic to move.
    pub variable: String,
    /// Amount added to every component of the characteristic.
    pub delta: Decimal,
}

impl UpdateEntry {
    /// Build an update entry.
    pub fn new(variable: impl Into<String>, delta: Decimal) -> Self {
        Self {
            variable: variable.into(),
            delta,
        }
    }
}

/// An outgoing edge of a scenario node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Edge identifier.
    pub id: EdgeId,
    /// Human-readable description of the action.
    pub description: String,
    /// The node this edge leads to.
    pub target: NodeId,
    /// Emotional and ethical conditions, evaluated identically and in order.
    pub conditions: Vec<Condition>,
}

/// Initial characteristics declared by a node, split by namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicProfile {
    /// Emotional characteristics by name.
    #[serde(default)]
    pub emotional: BTreeMap<String, FuzzyNumber>,
    /// Ethical characteristics by name.
    #[serde(default)]
    pub ethical: BTreeMap<String, FuzzyNumber>,
}

impl CharacteristicProfile {
    /// Whether the profile declares no characteristics at all.
    pub fn is_empty(&self) -> bool {
        self.emotional.is_empty() && self.ethical.is_empty()
    }
}

/// A scenario node as served by a graph provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    /// Node identifier.
    pub id: NodeId,
    /// Human-readable description of the situation.
    pub description: String,
    /// Changes applied to the agent when it arrives here.
    #[serde(default)]
    pub updates: Vec<UpdateEntry>,
    /// Characteristics an agent starting here is seeded with, if declared.
    #[serde(default)]
    pub profile: Option<CharacteristicProfile>,
}

/// Result of evaluating an edge's whole condition set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EdgeOutcome {
    /// Every condition held.
    Satisfied {
        /// Sum of the per-condition deviations.
        total_deviation: Decimal,
    },
    /// At least one condition failed; the first failure is reported.
    NotSatisfied {
        /// The characteristic whose condition failed.
        variable: String,
        /// Why it failed.
        reason: UnsatisfiedReason,
    },
}

impl EdgeOutcome {
    /// The total deviation, if the edge was satisfied.
    pub const fn total_deviation(&self) -> Option<Decimal> {
        match self {
            Self::Satisfied { total_deviation } => Some(*total_deviation),
            Self::NotSatisfied { .. } => None,
        }
    }

    /// Whether the edge was satisfied.
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }
}

/// One edge considered during a traversal step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The step (1-based) during which the edge was evaluated.
    pub step: u64,
    /// The node the agent was at.
    pub source: NodeId,
    /// The edge considered.
    pub edge: EdgeId,
    /// Description of the edge.
    pub edge_description: String,
    /// Where the edge leads.
    pub target: NodeId,
    /// The condition set that was evaluated.
    pub conditions: Vec<Condition>,
    /// Evaluation result.
    pub outcome: EdgeOutcome,
    /// Whether this edge was the one followed.
    pub chosen: bool,
}

/// The agent's characteristics upon arriving at a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Number of transitions taken before this arrival (0 for the start node).
    pub step: u64,
    /// The node arrived at.
    pub node: NodeId,
    /// Snapshot of every characteristic after the node's updates were applied.
    pub characteristics: BTreeMap<String, FuzzyNumber>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn edge_outcome_accessors() {
        let ok = EdgeOutcome::Satisfied {
            total_deviation: dec!(1.1),
        };
        assert!(ok.is_satisfied());
        assert_eq!(ok.total_deviation(), Some(dec!(1.1)));

        let failed = EdgeOutcome::NotSatisfied {
            variable: String::from("joy"),
            reason: UnsatisfiedReason::MissingCharacteristic,
        };
        assert!(!failed.is_satisfied());
        assert_eq!(failed.total_deviation(), None);
    }

    #[test]
    fn condition_deserializes_from_tagged_record() {
        let json = r#"{"variable":"fear","operator":"<=","constraint":[0.6,0.7,0.8]}"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(condition.variable, "fear");
        assert_eq!(condition.operator, ComparisonOperator::Le);
        assert_eq!(condition.constraint.crisp(), dec!(0.7));
    }

    #[test]
    fn condition_missing_operator_is_rejected() {
        let json = r#"{"variable":"fear","constraint":[0.6,0.7,0.8]}"#;
        assert!(serde_json::from_str::<Condition>(json).is_err());
    }

    #[test]
    fn edge_outcome_is_tagged_by_status() {
        let json = serde_json::to_value(EdgeOutcome::NotSatisfied {
            variable: String::from("joy"),
            reason: UnsatisfiedReason::ComparisonFailed,
        })
        .unwrap();
        assert_eq!(json["status"], "not_satisfied");
        assert_eq!(json["reason"], "comparison_failed");
    }
}
