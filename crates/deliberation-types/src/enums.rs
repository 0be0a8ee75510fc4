//! Enumeration types shared across the navigator.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A comparison operator that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown comparison operator: {operator:?} (expected one of =, >=, <=, >, <)")]
pub struct UnknownOperator {
    /// The text that failed to parse.
    pub operator: String,
}

/// Comparison between an agent characteristic and an edge constraint.
///
/// Written in scenario data as its symbol (`=`, `>=`, `<=`, `>`, `<`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ComparisonOperator {
    /// `=`: the crisp values are equal.
    Eq,
    /// `>=`: the agent value is at least the constraint.
    Ge,
    /// `<=`: the agent value is at most the constraint.
    Le,
    /// `>`: the agent value exceeds the constraint.
    Gt,
    /// `<`: the agent value is below the constraint.
    Lt,
}

impl ComparisonOperator {
    /// All operators, in the order they are documented.
    pub const ALL: [Self; 5] = [Self::Eq, Self::Ge, Self::Le, Self::Gt, Self::Lt];

    /// The operator's symbol as written in scenario data.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Self::Eq),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            other => Err(UnknownOperator {
                operator: other.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for ComparisonOperator {
    type Error = UnknownOperator;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComparisonOperator> for String {
    fn from(op: ComparisonOperator) -> Self {
        op.symbol().to_owned()
    }
}

impl core::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The namespace a characteristic belongs to.
///
/// Names are unique across both namespaces; the kind only records where a
/// characteristic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicKind {
    /// Joy, fear, guilt, and other emotions.
    Emotional,
    /// Responsibility, goodness, conscience, evil.
    Ethical,
}

impl CharacteristicKind {
    /// Lowercase label used in storage and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emotional => "emotional",
            Self::Ethical => "ethical",
        }
    }
}

/// Why a traversal stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The graph provider has no node with the current id.
    NoSuchNode,
    /// The current node has no outgoing edges.
    NoOutgoingEdges,
    /// No outgoing edge had all of its conditions satisfied.
    NoSatisfiableEdge,
    /// The configured maximum number of transitions was reached.
    StepBudgetExhausted,
    /// The current node was reached more often than the configured budget allows.
    VisitBudgetExhausted,
}

impl TerminationReason {
    /// Snake-case label, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoSuchNode => "no_such_node",
            Self::NoOutgoingEdges => "no_outgoing_edges",
            Self::NoSatisfiableEdge => "no_satisfiable_edge",
            Self::StepBudgetExhausted => "step_budget_exhausted",
            Self::VisitBudgetExhausted => "visit_budget_exhausted",
        }
    }
}

/// Why an edge's condition set was not satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsatisfiedReason {
    /// The agent has no characteristic with the referenced name.
    MissingCharacteristic,
    /// The crisp comparison evaluated to false.
    ComparisonFailed,
}

impl UnsatisfiedReason {
    /// Snake-case label, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingCharacteristic => "missing_characteristic",
            Self::ComparisonFailed => "comparison_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_parse_from_their_symbols() {
        for op in ComparisonOperator::ALL {
            assert_eq!(op.symbol().parse::<ComparisonOperator>(), Ok(op));
        }
    }

    #[test]
    fn near_miss_spellings_are_unknown() {
        for symbol in ["==", " >= ", "=<", "!="] {
            assert_eq!(
                symbol.parse::<ComparisonOperator>(),
                Err(UnknownOperator {
                    operator: symbol.to_owned()
                })
            );
        }
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = "=>".parse::<ComparisonOperator>();
        assert_eq!(
            err,
            Err(UnknownOperator {
                operator: String::from("=>")
            })
        );
        let from_json: Result<ComparisonOperator, _> = serde_json::from_str("\"!=\"");
        assert!(from_json.is_err());
    }

    #[test]
    fn operator_serializes_as_symbol() {
        let json = serde_json::to_string(&ComparisonOperator::Le).ok();
        assert_eq!(json.as_deref(), Some("\"<=\""));
    }

    #[test]
    fn termination_reason_serializes_snake_case() {
        let json = serde_json::to_string(&TerminationReason::NoSatisfiableEdge).ok();
        assert_eq!(json.as_deref(), Some("\"no_satisfiable_edge\""));
    }

    #[test]
    fn labels_match_serialized_form() {
        for reason in [
            TerminationReason::NoSuchNode,
            TerminationReason::NoOutgoingEdges,
            TerminationReason::NoSatisfiableEdge,
            TerminationReason::StepBudgetExhausted,
            TerminationReason::VisitBudgetExhausted,
        ] {
            let json = serde_json::to_string(&reason).ok();
            assert_eq!(json, Some(format!("\"{}\"", reason.as_str())));
        }
        let json = serde_json::to_string(&UnsatisfiedReason::MissingCharacteristic).ok();
        assert_eq!(
            json,
            Some(format!(
                "\"{}\"",
                UnsatisfiedReason::MissingCharacteristic.as_str()
            ))
        );
    }
}
