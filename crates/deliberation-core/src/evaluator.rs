//! Condition evaluation.
//!
//! A condition compares the crisp value (the peak `b`) of an agent
//! characteristic with the crisp value of the constraint. Full fuzzy
//! inference is not performed; the peak stands in for the value after
//! inference.
//!
//! A satisfied condition also yields a non-negative *deviation*: how far
//! the agent's value clears the threshold in the direction the operator
//! asks for. An edge is scored by the sum of its conditions' deviations.
//!
//! | operator | satisfied when | deviation |
//! |----------|----------------|-----------|
//! | `=`      | `agent == constraint` | `0` |
//! | `>=`     | `agent >= constraint` | `agent - constraint` |
//! | `>`      | `agent > constraint`  | `agent - constraint` |
//! | `<=`     | `agent <= constraint` | `constraint - agent` |
//! | `<`      | `agent < constraint`  | `constraint - agent` |

use deliberation_agents::AgentState;
use deliberation_types::{
    ComparisonOperator, Condition, EdgeOutcome, FuzzyNumber, UnsatisfiedReason,
};
use rust_decimal::Decimal;
use tracing::warn;

/// Result of evaluating a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOutcome {
    /// The comparison held.
    Satisfied {
        /// How strongly it held; never negative.
        deviation: Decimal,
    },
    /// The comparison did not hold.
    NotSatisfied,
}

/// Evaluate one comparison between an agent value and a constraint.
pub fn evaluate(
    agent: &FuzzyNumber,
    operator: ComparisonOperator,
    constraint: &FuzzyNumber,
) -> ConditionOutcome {
    let value = agent.crisp();
    let threshold = constraint.crisp();

    let (holds, deviation) = match operator {
        ComparisonOperator::Eq => (value == threshold, Decimal::ZERO),
        ComparisonOperator::Ge => (value >= threshold, value.saturating_sub(threshold)),
        ComparisonOperator::Gt => (value > threshold, value.saturating_sub(threshold)),
        ComparisonOperator::Le => (value <= threshold, threshold.saturating_sub(value)),
        ComparisonOperator::Lt => (value < threshold, threshold.saturating_sub(value)),
    };

    if holds {
        ConditionOutcome::Satisfied {
            deviation: deviation.max(Decimal::ZERO),
        }
    } else {
        ConditionOutcome::NotSatisfied
    }
}

/// Evaluate an edge's condition set against the agent.
///
/// Stops at the first condition that fails or that names a characteristic
/// the agent does not have; a missing characteristic blocks the edge but
/// is not an error. An empty set is satisfied with a total deviation of 0.
pub fn evaluate_all(agent: &AgentState, conditions: &[Condition]) -> EdgeOutcome {
    let mut total = Decimal::ZERO;

    for condition in conditions {
        let Some(value) = agent.find(&condition.variable) else {
            warn!(
                characteristic = condition.variable,
                "condition references a characteristic the agent does not have"
            );
            return EdgeOutcome::NotSatisfied {
                variable: condition.variable.clone(),
                reason: UnsatisfiedReason::MissingCharacteristic,
            };
        };

        match evaluate(&value, condition.operator, &condition.constraint) {
            ConditionOutcome::Satisfied { deviation } => {
                total = total.saturating_add(deviation);
            }
            ConditionOutcome::NotSatisfied => {
                return EdgeOutcome::NotSatisfied {
                    variable: condition.variable.clone(),
                    reason: UnsatisfiedReason::ComparisonFailed,
                };
            }
        }
    }

    EdgeOutcome::Satisfied {
        total_deviation: total,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use deliberation_types::{CharacteristicKind, CharacteristicProfile};
    use rust_decimal_macros::dec;

    use super::*;

    fn at(peak: Decimal) -> FuzzyNumber {
        FuzzyNumber::new(peak - dec!(0.1), peak, peak + dec!(0.1)).unwrap()
    }

    fn agent(entries: &[(&str, Decimal)]) -> AgentState {
        let mut profile = CharacteristicProfile::default();
        for &(name, peak) in entries {
            profile.emotional.insert(name.to_owned(), at(peak));
        }
        AgentState::from_profile(&profile).unwrap()
    }

    fn satisfied(deviation: Decimal) -> ConditionOutcome {
        ConditionOutcome::Satisfied { deviation }
    }

    #[test]
    fn equality_has_zero_deviation() {
        assert_eq!(
            evaluate(&at(dec!(0.5)), ComparisonOperator::Eq, &at(dec!(0.5))),
            satisfied(Decimal::ZERO)
        );
        assert_eq!(
            evaluate(&at(dec!(0.5)), ComparisonOperator::Eq, &at(dec!(0.6))),
            ConditionOutcome::NotSatisfied
        );
    }

    #[test]
    fn greater_operators_measure_excess() {
        let agent_value = at(dec!(0.8));
        assert_eq!(
            evaluate(&agent_value, ComparisonOperator::Ge, &at(dec!(0.5))),
            satisfied(dec!(0.3))
        );
        assert_eq!(
            evaluate(&agent_value, ComparisonOperator::Ge, &at(dec!(0.8))),
            satisfied(Decimal::ZERO)
        );
        assert_eq!(
            evaluate(&agent_value, ComparisonOperator::Gt, &at(dec!(0.8))),
            ConditionOutcome::NotSatisfied
        );
        assert_eq!(
            evaluate(&agent_value, ComparisonOperator::Gt, &at(dec!(0.75))),
            satisfied(dec!(0.05))
        );
    }

    #[test]
    fn lesser_operators_measure_headroom() {
        let agent_value = at(dec!(0.3));
        assert_eq!(
            evaluate(&agent_value, ComparisonOperator::Le, &at(dec!(0.7))),
            satisfied(dec!(0.4))
        );
        assert_eq!(
            evaluate(&agent_value, ComparisonOperator::Le, &at(dec!(0.3))),
            satisfied(Decimal::ZERO)
        );
        assert_eq!(
            evaluate(&agent_value, ComparisonOperator::Lt, &at(dec!(0.3))),
            ConditionOutcome::NotSatisfied
        );
        assert_eq!(
            evaluate(&agent_value, ComparisonOperator::Le, &at(dec!(0.2))),
            ConditionOutcome::NotSatisfied
        );
    }

    #[test]
    fn outcome_matches_crisp_comparison_for_all_operators() {
        let peaks = [dec!(0.1), dec!(0.35), dec!(0.5), dec!(0.9)];
        for op in ComparisonOperator::ALL {
            for &lhs in &peaks {
                for &rhs in &peaks {
                    let expected = match op {
                        ComparisonOperator::Eq => lhs == rhs,
                        ComparisonOperator::Ge => lhs >= rhs,
                        ComparisonOperator::Le => lhs <= rhs,
                        ComparisonOperator::Gt => lhs > rhs,
                        ComparisonOperator::Lt => lhs < rhs,
                    };
                    match evaluate(&at(lhs), op, &at(rhs)) {
                        ConditionOutcome::Satisfied { deviation } => {
                            assert!(expected, "{lhs} {op} {rhs} should fail");
                            assert!(deviation >= Decimal::ZERO);
                        }
                        ConditionOutcome::NotSatisfied => {
                            assert!(!expected, "{lhs} {op} {rhs} should hold");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn only_the_peak_is_compared() {
        let wide = FuzzyNumber::new(dec!(0.0), dec!(0.5), dec!(1.0)).unwrap();
        let narrow = FuzzyNumber::new(dec!(0.55), dec!(0.6), dec!(0.65)).unwrap();
        assert_eq!(
            evaluate(&wide, ComparisonOperator::Ge, &narrow),
            ConditionOutcome::NotSatisfied
        );
    }

    #[test]
    fn empty_condition_set_is_vacuously_satisfied() {
        let state = AgentState::new();
        assert_eq!(
            evaluate_all(&state, &[]),
            EdgeOutcome::Satisfied {
                total_deviation: Decimal::ZERO
            }
        );
    }

    #[test]
    fn deviations_are_summed() {
        let state = agent(&[("joy", dec!(0.7)), ("fear", dec!(0.2))]);
        let conditions = [
            Condition::new("joy", ComparisonOperator::Ge, at(dec!(0.6))),
            Condition::new("fear", ComparisonOperator::Le, at(dec!(0.5))),
        ];
        assert_eq!(
            evaluate_all(&state, &conditions),
            EdgeOutcome::Satisfied {
                total_deviation: dec!(0.4)
            }
        );
    }

    #[test]
    fn any_failure_fails_the_set() {
        let state = agent(&[("joy", dec!(0.9)), ("fear", dec!(0.8))]);
        let conditions = [
            Condition::new("joy", ComparisonOperator::Ge, at(dec!(0.1))),
            Condition::new("fear", ComparisonOperator::Le, at(dec!(0.5))),
            Condition::new("joy", ComparisonOperator::Gt, at(dec!(0.2))),
        ];
        assert_eq!(
            evaluate_all(&state, &conditions),
            EdgeOutcome::NotSatisfied {
                variable: String::from("fear"),
                reason: UnsatisfiedReason::ComparisonFailed,
            }
        );
    }

    #[test]
    fn result_does_not_depend_on_condition_order() {
        let state = agent(&[("joy", dec!(0.9)), ("fear", dec!(0.8))]);
        let passing = Condition::new("joy", ComparisonOperator::Ge, at(dec!(0.1)));
        let failing = Condition::new("fear", ComparisonOperator::Lt, at(dec!(0.5)));
        let forward = evaluate_all(&state, &[passing.clone(), failing.clone()]);
        let backward = evaluate_all(&state, &[failing, passing]);
        assert!(!forward.is_satisfied());
        assert!(!backward.is_satisfied());
    }

    #[test]
    fn missing_characteristic_blocks_without_error() {
        let mut state = agent(&[("fear", dec!(0.3))]);
        state
            .insert(CharacteristicKind::Ethical, "evil", at(dec!(0.3)))
            .unwrap();
        let conditions = [
            Condition::new("fear", ComparisonOperator::Le, at(dec!(0.5))),
            Condition::new("joy", ComparisonOperator::Ge, at(dec!(0.6))),
        ];
        assert_eq!(
            evaluate_all(&state, &conditions),
            EdgeOutcome::NotSatisfied {
                variable: String::from("joy"),
                reason: UnsatisfiedReason::MissingCharacteristic,
            }
        );
    }
}
